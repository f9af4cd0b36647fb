//! Working out what a downloaded payload actually is, and turning
//! it into an mp3 if it isn't one already.
//!
//! The stream endpoint usually serves mp3, but sometimes sends other
//! containers or an error page with a success status. Probing the bytes
//! is the only reliable way to tell, since the headers are often wrong.

use std::{io::Cursor, process::Stdio};

use bytes::Bytes;
use symphonia::core::{
    codecs::CODEC_TYPE_MP3, formats::FormatOptions, io::MediaSourceStream, meta::MetadataOptions,
    probe::Hint,
};
use tokio::{io::AsyncWriteExt, process::Command};

use crate::tracks::{Kind, Result};

/// What a payload turned out to be.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Payload {
    /// Already an mp3.
    Mp3,

    /// Some other kind of audio, with the short name of its codec.
    Audio(String),

    /// Not recognizable as audio.
    Unknown,
}

/// Probes `data` to find out what kind of payload it is.
pub fn classify(data: &Bytes) -> Payload {
    let source = MediaSourceStream::new(Box::new(Cursor::new(data.clone())), Default::default());
    let probed = symphonia::default::get_probe().format(
        &Hint::new(),
        source,
        &FormatOptions::default(),
        &MetadataOptions::default(),
    );

    let Ok(probed) = probed else {
        return Payload::Unknown;
    };

    let Some(track) = probed.format.default_track() else {
        return Payload::Unknown;
    };

    let codec = track.codec_params.codec;
    if codec == CODEC_TYPE_MP3 {
        return Payload::Mp3;
    }

    let name = symphonia::default::get_codecs()
        .get_codec(codec)
        .map_or("unknown", |x| x.short_name);

    Payload::Audio(name.to_owned())
}

/// Makes sure that `data` is an mp3, transcoding it if necessary.
pub async fn prepare(data: Bytes) -> Result<Bytes> {
    match classify(&data) {
        Payload::Mp3 => Ok(data),
        Payload::Audio(codec) => {
            tracing::debug!(%codec, "transcoding to mp3");
            transcode(data).await
        }
        Payload::Unknown => Err(Kind::NotAudio.into()),
    }
}

/// Transcodes audio to mp3 by piping it through `ffmpeg`.
pub async fn transcode(data: Bytes) -> Result<Bytes> {
    let mut child = Command::new("ffmpeg")
        .args(["-hide_banner", "-loglevel", "error"])
        .args(["-i", "pipe:0", "-f", "mp3", "pipe:1"])
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true)
        .spawn()
        .map_err(|e| Kind::Transcode(format!("couldn't start ffmpeg: {e}")))?;

    let mut stdin = child
        .stdin
        .take()
        .ok_or_else(|| Kind::Transcode(String::from("ffmpeg stdin unavailable")))?;

    // Input is written while output is read, otherwise a full pipe would block both sides.
    let write = async move {
        let result = stdin.write_all(&data).await;
        drop(stdin);
        result
    };

    let (written, output) = tokio::join!(write, child.wait_with_output());
    let output = output?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(Kind::Transcode(stderr.trim().to_owned()).into());
    }

    written?;
    Ok(Bytes::from(output.stdout))
}
