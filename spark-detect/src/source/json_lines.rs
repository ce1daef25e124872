use crate::detection::DetectionFrame;
use crate::source::DetectionSource;
use anyhow::Result;
use log::{info, warn};
use std::path::Path;
use tokio::fs::File;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader, Lines, Stdin};

/// Reads one JSON-encoded [`DetectionFrame`] per line.
pub struct JsonLinesSource<R> {
    lines: Lines<R>,
    line_number: usize,
}

impl<R: AsyncBufRead + Unpin> JsonLinesSource<R> {
    pub fn new(reader: R) -> Self {
        Self {
            lines: reader.lines(),
            line_number: 0,
        }
    }
}

impl JsonLinesSource<BufReader<Stdin>> {
    pub fn stdin() -> Self {
        Self::new(BufReader::new(tokio::io::stdin()))
    }
}

impl JsonLinesSource<BufReader<File>> {
    pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
        let file = File::open(path.as_ref()).await?;
        info!("Reading detection frames from {}", path.as_ref().display());
        Ok(Self::new(BufReader::new(file)))
    }
}

impl<R: AsyncBufRead + Unpin> DetectionSource for JsonLinesSource<R> {
    async fn next_frame(&mut self) -> Result<Option<DetectionFrame>> {
        while let Some(line) = self.lines.next_line().await? {
            self.line_number += 1;
            let line = line.trim();
            if line.is_empty() {
                continue;
            }

            match serde_json::from_str::<DetectionFrame>(line) {
                Ok(frame) => return Ok(Some(frame)),
                Err(e) => warn!("Skipping malformed frame on line {}: {}", self.line_number, e),
            }
        }

        Ok(None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn reads_frames_and_skips_noise() -> Result<()> {
        let input = concat!(
            r#"{"frame_index":1,"detections":[]}"#,
            "\n\n",
            "not json\n",
            r#"{"frame_index":2,"width":640,"height":480,"detections":[{"class_id":0,"track_id":4,"bbox":{"x1":1,"y1":2,"x2":3,"y2":4}}]}"#,
            "\n",
        );
        let mut source = JsonLinesSource::new(input.as_bytes());

        let first = source.next_frame().await?.expect("first frame");
        assert_eq!(first.frame_index, 1);

        let second = source.next_frame().await?.expect("second frame");
        assert_eq!(second.frame_index, 2);
        assert_eq!(second.width, Some(640));
        assert_eq!(second.detections[0].track_id, Some(4));

        assert!(source.next_frame().await?.is_none());
        Ok(())
    }
}
