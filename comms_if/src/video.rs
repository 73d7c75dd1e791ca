//! # Video Transport Pipeline Module
//!
//! The video link is carried by external `gst-launch-1.0` processes, one
//! encoding on the vehicle and one decoding (or recording) on the surface.
//! This module builds the fixed command lines for those processes from the
//! shared video parameters. The pipelines themselves are opaque to the rest
//! of the software, their exit status is the only observable contract.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use serde::Deserialize;

// ------------------------------------------------------------------------------------------------
// CONSTANTS
// ------------------------------------------------------------------------------------------------

/// The launcher binary for all video pipelines.
pub const GST_LAUNCH: &str = "gst-launch-1.0";

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// Video transport parameters, loaded from `video.toml`.
///
/// These are configuration constants consumed only by the external
/// pipelines, nothing else ever inspects the video payload.
#[derive(Debug, Clone, Deserialize)]
pub struct VideoParams {
    /// The vehicle camera device, e.g. `/dev/video1`
    pub device: String,

    /// Stream width in pixels
    pub width: u32,

    /// Stream height in pixels
    pub height: u32,

    /// Stream frame rate in frames per second
    pub framerate: u32,

    /// Encoder bitrate.
    ///
    /// Units: kilobits/second
    pub bitrate_kbps: u32,

    /// Host the vehicle streams the encoded video to (the surface station)
    pub stream_host: String,

    /// UDP port carrying the video stream on both sides
    pub stream_port: u16,

    /// File the surface's record pipeline writes to
    pub record_file: String,

    /// Interval between supervisor health checks of a pipeline process.
    ///
    /// Units: seconds
    pub check_interval_s: f64,
}

/// A fully-formed command line for one pipeline process.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineCommand {
    /// Program to launch
    pub program: String,

    /// Argument list passed to the program
    pub args: Vec<String>,
}

// ------------------------------------------------------------------------------------------------
// PUBLIC FUNCTIONS
// ------------------------------------------------------------------------------------------------

/// Build the vehicle-side encode pipeline.
///
/// Camera frames are H264 encoded with zero-latency tuning and streamed as
/// RTP over UDP to the surface station.
pub fn encode_command(params: &VideoParams) -> PipelineCommand {
    PipelineCommand {
        program: GST_LAUNCH.into(),
        args: vec![
            "v4l2src".into(),
            format!("device={}", params.device),
            "!".into(),
            format!(
                "video/x-raw,width={},height={},framerate={}/1",
                params.width, params.height, params.framerate
            ),
            "!".into(),
            "videoconvert".into(),
            "!".into(),
            "x264enc".into(),
            "tune=zerolatency".into(),
            format!("bitrate={}", params.bitrate_kbps),
            "speed-preset=superfast".into(),
            "!".into(),
            "rtph264pay".into(),
            "config-interval=1".into(),
            "pt=96".into(),
            "!".into(),
            "udpsink".into(),
            format!("host={}", params.stream_host),
            format!("port={}", params.stream_port),
            "sync=false".into(),
        ],
    }
}

/// Build the surface-side decode and display pipeline.
pub fn display_command(params: &VideoParams) -> PipelineCommand {
    PipelineCommand {
        program: GST_LAUNCH.into(),
        args: vec![
            "udpsrc".into(),
            format!("port={}", params.stream_port),
            "!".into(),
            rtp_caps(),
            "!".into(),
            "rtph264depay".into(),
            "!".into(),
            "avdec_h264".into(),
            "!".into(),
            "videoconvert".into(),
            "!".into(),
            "autovideosink".into(),
            "sync=false".into(),
        ],
    }
}

/// Build the surface-side record pipeline.
///
/// Binds the same video port as the display pipeline, so only one of the two
/// can consume the stream at a time.
pub fn record_command(params: &VideoParams) -> PipelineCommand {
    PipelineCommand {
        program: GST_LAUNCH.into(),
        args: vec![
            "udpsrc".into(),
            format!("port={}", params.stream_port),
            "!".into(),
            rtp_caps(),
            "!".into(),
            "rtph264depay".into(),
            "!".into(),
            "h264parse".into(),
            "!".into(),
            "mp4mux".into(),
            "!".into(),
            "filesink".into(),
            format!("location={}", params.record_file),
        ],
    }
}

// ------------------------------------------------------------------------------------------------
// PRIVATE FUNCTIONS
// ------------------------------------------------------------------------------------------------

/// The RTP caps filter shared by the receive-side pipelines.
fn rtp_caps() -> String {
    "application/x-rtp, media=video, encoding-name=H264, payload=96".into()
}

// ------------------------------------------------------------------------------------------------
// TESTS
// ------------------------------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn test_params() -> VideoParams {
        VideoParams {
            device: String::from("/dev/video1"),
            width: 1280,
            height: 720,
            framerate: 30,
            bitrate_kbps: 2000,
            stream_host: String::from("10.0.0.13"),
            stream_port: 5000,
            record_file: String::from("rov_recording.mp4"),
            check_interval_s: 5.0,
        }
    }

    #[test]
    fn test_encode_command() {
        let cmd = encode_command(&test_params());

        assert_eq!(cmd.program, "gst-launch-1.0");
        assert_eq!(cmd.args[0], "v4l2src");
        assert_eq!(cmd.args[1], "device=/dev/video1");
        assert!(cmd
            .args
            .contains(&String::from("video/x-raw,width=1280,height=720,framerate=30/1")));
        assert!(cmd.args.contains(&String::from("bitrate=2000")));
        assert!(cmd.args.contains(&String::from("host=10.0.0.13")));
        assert!(cmd.args.contains(&String::from("port=5000")));
    }

    #[test]
    fn test_receive_side_commands_share_the_stream_port() {
        let params = test_params();

        let display = display_command(&params);
        let record = record_command(&params);

        assert!(display.args.contains(&String::from("port=5000")));
        assert!(record.args.contains(&String::from("port=5000")));
        assert!(record.args.contains(&String::from("location=rov_recording.mp4")));
    }
}
