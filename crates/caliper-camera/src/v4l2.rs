use crate::convert::yuyv_to_rgb;
use crate::{Camera, CameraConfig, CameraDevice, CameraError};
use caliper_image::Frame;
use std::thread::{self, JoinHandle};
use tokio::sync::mpsc;
use v4l::buffer::Type;
use v4l::io::mmap::Stream as MmapStream;
use v4l::io::traits::CaptureStream;
use v4l::video::Capture;
use v4l::{Device, Format, FourCC};

type FrameResult = Result<Frame, CameraError>;

/// Pixel formats the capture loop knows how to turn into frames.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum PixelFormat {
    Mjpeg,
    Yuyv,
}

/// Opens V4L2 devices by path (taken from `CameraConfig::device`).
#[derive(Clone, Copy, Debug, Default)]
pub struct V4l2Device;

impl CameraDevice for V4l2Device {
    type Camera = V4l2Camera;

    /// Open the device and start streaming right away, so exposure can
    /// settle before the first `recv()`.
    async fn open(&self, config: &CameraConfig) -> Result<V4l2Camera, CameraError> {
        let mut camera = V4l2Camera::new(config.clone())?;
        camera.ensure_started()?;
        Ok(camera)
    }
}

/// V4L2 camera stream.
///
/// Frames are read on a background thread, started by `V4l2Device::open` or
/// else by the first `recv()`.
/// Dropping the camera stops the thread and closes the device.
pub struct V4l2Camera {
    config: CameraConfig,
    format: Format,
    pixel_format: PixelFormat,
    device: Option<Device>,
    receiver: Option<mpsc::Receiver<FrameResult>>,
    thread_handle: Option<JoinHandle<()>>,
}

impl std::fmt::Debug for V4l2Camera {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("V4l2Camera")
            .field("config", &self.config)
            .field("width", &self.format.width)
            .field("height", &self.format.height)
            .field("pixel_format", &self.pixel_format)
            .field("streaming", &self.receiver.is_some())
            .finish()
    }
}

impl Camera for V4l2Camera {
    async fn recv(&mut self) -> Result<Frame, CameraError> {
        self.ensure_started()?;

        let receiver = self
            .receiver
            .as_mut()
            .ok_or_else(|| CameraError::Channel("Receiver not initialized".to_string()))?;

        receiver
            .recv()
            .await
            .ok_or_else(|| CameraError::Channel("Channel closed".to_string()))?
    }
}

impl Drop for V4l2Camera {
    fn drop(&mut self) {
        // Closing the channel makes the capture thread exit after its current frame.
        drop(self.receiver.take());

        if let Some(handle) = self.thread_handle.take() {
            let _ = handle.join();
        }
        log::debug!("Camera {} released", self.config.device());
    }
}

impl V4l2Camera {
    /// Open the device at `config.device()` and negotiate a format.
    ///
    /// MJPEG at the requested resolution is preferred; YUYV is accepted as a
    /// fallback. The driver may adjust the resolution.
    ///
    /// # Errors
    ///
    /// Returns `CameraError::Access` if the device does not exist or cannot be
    /// opened for lack of permission, `CameraError::Device` if neither format
    /// is supported or format negotiation fails.
    pub fn new(config: CameraConfig) -> Result<Self, CameraError> {
        let device = Device::with_path(config.device())?;

        let (format, pixel_format) = Self::negotiate_format(&device, &config)?;

        let params = v4l::video::capture::Parameters::with_fps(config.fps());
        Capture::set_params(&device, &params)?;

        log::info!(
            "Camera {} opened: {}x{} {:?}",
            config.device(),
            format.width,
            format.height,
            pixel_format
        );

        Ok(Self {
            config,
            format,
            pixel_format,
            device: Some(device),
            receiver: None,
            thread_handle: None,
        })
    }

    fn negotiate_format(device: &Device, config: &CameraConfig) -> Result<(Format, PixelFormat), CameraError> {
        for (fourcc, pixel_format) in [(b"MJPG", PixelFormat::Mjpeg), (b"YUYV", PixelFormat::Yuyv)] {
            let requested = Format::new(config.width(), config.height(), FourCC::new(fourcc));
            let accepted = Capture::set_format(device, &requested)?;
            if accepted.fourcc == FourCC::new(fourcc) {
                return Ok((accepted, pixel_format));
            }
        }
        Err(CameraError::Device(
            "neither MJPEG nor YUYV is supported by the device".to_string(),
        ))
    }

    /// Start the capture thread if not already running.
    fn ensure_started(&mut self) -> Result<(), CameraError> {
        if self.receiver.is_some() {
            return Ok(());
        }

        let device = self
            .device
            .take()
            .ok_or_else(|| CameraError::Device("Device already consumed".to_string()))?;

        let buffer_count = self.config.buffer_count();
        let (tx, rx) = mpsc::channel(buffer_count as usize);
        let format = self.format.clone();
        let pixel_format = self.pixel_format;

        let handle = thread::spawn(move || {
            if let Err(e) = Self::capture_loop(device, format, pixel_format, &tx, buffer_count) {
                log::error!("Capture thread error: {}", e);
                let _ = tx.blocking_send(Err(e));
            }
        });

        self.receiver = Some(rx);
        self.thread_handle = Some(handle);

        Ok(())
    }

    /// Background capture loop: read a buffer, convert it, push it to the channel.
    fn capture_loop(
        device: Device,
        format: Format,
        pixel_format: PixelFormat,
        tx: &mpsc::Sender<FrameResult>,
        buffer_count: u32,
    ) -> Result<(), CameraError> {
        let mut stream = MmapStream::with_buffers(&device, Type::VideoCapture, buffer_count)
            .map_err(|e| CameraError::Stream(e.to_string()))?;

        loop {
            let (buffer, meta) =
                CaptureStream::next(&mut stream).map_err(|e| CameraError::Stream(e.to_string()))?;

            // The buffer is only valid until the next call.
            let used = (meta.bytesused as usize).min(buffer.len());
            let frame = Self::convert(&buffer[..used], &format, pixel_format);

            if tx.blocking_send(frame).is_err() {
                // Receiver dropped
                break;
            }
        }

        Ok(())
    }

    fn convert(data: &[u8], format: &Format, pixel_format: PixelFormat) -> FrameResult {
        match pixel_format {
            PixelFormat::Mjpeg => Ok(caliper_image::decode_image(data)?),
            PixelFormat::Yuyv => {
                let rgb = yuyv_to_rgb(data, format.width, format.height).ok_or_else(|| {
                    CameraError::Stream(format!("short YUYV buffer: {} bytes", data.len()))
                })?;
                Ok(Frame::rgb(format.width, format.height, rgb)?)
            }
        }
    }

    pub fn config(&self) -> &CameraConfig {
        &self.config
    }
}
