//! Microphone capture state machine
//!
//! `Idle → Recording → Idle`. The cpal input callback produces fixed-size
//! float frames into an unbounded queue; `drain` consumes them from the
//! caller's thread. A shared stop flag quiesces the producer before the
//! stream is closed, so no frame is enqueued after stop is observed.

use crate::config::{CAPTURE_CHANNELS, CAPTURE_SAMPLE_RATE};
use crate::error::{AppError, Result};
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{Receiver, Sender};
use std::sync::{mpsc, Arc};

/// Unbounded frame queue between the capture callback and the drain caller
pub struct FrameQueue {
    sender: Sender<Vec<f32>>,
    receiver: Receiver<Vec<f32>>,
    halted: Arc<AtomicBool>,
}

/// Producer handle given to the capture callback
#[derive(Clone)]
pub struct FrameProducer {
    sender: Sender<Vec<f32>>,
    halted: Arc<AtomicBool>,
}

impl FrameProducer {
    /// Enqueue one frame. Frames pushed after the queue is halted are
    /// dropped; the flag is checked on every invocation.
    pub fn push(&self, frame: &[f32]) {
        if self.halted.load(Ordering::SeqCst) {
            return;
        }
        let _ = self.sender.send(frame.to_vec());
    }
}

impl FrameQueue {
    pub fn new() -> Self {
        let (sender, receiver) = mpsc::channel();
        Self {
            sender,
            receiver,
            halted: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn producer(&self) -> FrameProducer {
        FrameProducer {
            sender: self.sender.clone(),
            halted: Arc::clone(&self.halted),
        }
    }

    /// Stop accepting frames
    pub fn halt(&self) {
        self.halted.store(true, Ordering::SeqCst);
    }

    /// Pull every queued frame, concatenate in arrival order, and scale
    /// normalized floats to the 16-bit signed range. `None` if nothing
    /// was captured.
    pub fn drain(&self) -> Option<Vec<i16>> {
        let mut samples = Vec::new();
        while let Ok(frame) = self.receiver.try_recv() {
            samples.extend(frame.iter().map(|&s| (s * 32767.0) as i16));
        }

        if samples.is_empty() {
            None
        } else {
            Some(samples)
        }
    }
}

impl Default for FrameQueue {
    fn default() -> Self {
        Self::new()
    }
}

/// Voice recorder over the default input device
pub struct VoiceRecorder {
    queue: FrameQueue,
    stream: Option<cpal::Stream>,
}

impl VoiceRecorder {
    pub fn new() -> Self {
        Self {
            queue: FrameQueue::new(),
            stream: None,
        }
    }

    pub fn is_recording(&self) -> bool {
        self.stream.is_some()
    }

    /// Open a live input stream and transition to `Recording`.
    ///
    /// Stale frames from an earlier cycle are discarded. Calling start
    /// while already recording is rejected, never a silent double-open.
    pub fn start(&mut self) -> Result<()> {
        if self.stream.is_some() {
            return Err(AppError::AlreadyRecording);
        }

        self.queue = FrameQueue::new();
        let producer = self.queue.producer();

        let host = cpal::default_host();
        let device = host
            .default_input_device()
            .ok_or_else(|| AppError::AudioDevice("no input device available".to_string()))?;

        tracing::info!(
            "Recording from input device: {}",
            device.name().unwrap_or_default()
        );

        let config = cpal::StreamConfig {
            channels: CAPTURE_CHANNELS,
            sample_rate: cpal::SampleRate(CAPTURE_SAMPLE_RATE),
            buffer_size: cpal::BufferSize::Default,
        };

        let stream = device
            .build_input_stream(
                &config,
                move |data: &[f32], _: &cpal::InputCallbackInfo| {
                    producer.push(data);
                },
                move |err| {
                    tracing::error!("Input stream error: {}", err);
                },
                None,
            )
            .map_err(|e| AppError::AudioDevice(e.to_string()))?;

        stream.play().map_err(|e| AppError::AudioDevice(e.to_string()))?;
        self.stream = Some(stream);

        Ok(())
    }

    /// Signal the callback to halt, close the stream, and transition to
    /// `Idle`. Does not drain the queue.
    pub fn stop(&mut self) -> Result<()> {
        let stream = self.stream.take().ok_or(AppError::NotRecording)?;

        // Quiesce the producer before tearing the stream down
        self.queue.halt();
        drop(stream);

        tracing::info!("Recording stopped");
        Ok(())
    }

    /// Concatenate everything captured so far into one 16-bit buffer.
    /// Safe to call from `Idle`; `None` when no frames arrived.
    pub fn drain(&mut self) -> Option<Vec<i16>> {
        self.queue.drain()
    }
}

impl Default for VoiceRecorder {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for VoiceRecorder {
    fn drop(&mut self) {
        if self.stream.is_some() {
            let _ = self.stop();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn drain_without_frames_is_none() {
        let queue = FrameQueue::new();
        assert!(queue.drain().is_none());
    }

    #[test]
    fn drain_concatenates_frames_in_arrival_order() {
        let queue = FrameQueue::new();
        let producer = queue.producer();

        producer.push(&[0.0, 0.5]);
        producer.push(&[-0.5, 1.0]);
        queue.halt();

        let buffer = queue.drain().unwrap();
        assert_eq!(buffer, vec![0, 16383, -16383, 32767]);
    }

    #[test]
    fn halted_queue_drops_new_frames() {
        let queue = FrameQueue::new();
        let producer = queue.producer();

        producer.push(&[0.25]);
        queue.halt();
        producer.push(&[0.75]);

        let buffer = queue.drain().unwrap();
        assert_eq!(buffer.len(), 1);
        assert_eq!(buffer[0], 8191);
    }

    #[test]
    fn drain_twice_returns_none_second_time() {
        let queue = FrameQueue::new();
        let producer = queue.producer();

        producer.push(&[0.1, 0.2]);
        queue.halt();

        assert!(queue.drain().is_some());
        assert!(queue.drain().is_none());
    }

    #[test]
    fn scaling_truncates_toward_zero() {
        let queue = FrameQueue::new();
        let producer = queue.producer();

        // 0.9999 * 32767 = 32763.72..., truncated to 32763
        producer.push(&[0.9999, -0.9999]);
        queue.halt();

        let buffer = queue.drain().unwrap();
        assert_eq!(buffer, vec![32763, -32763]);
    }
}
