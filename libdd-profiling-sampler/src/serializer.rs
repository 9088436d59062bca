// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

use lz4_flex::frame::FrameEncoder;
use std::io::Write;

/// Encodes protobuf messages one at a time and lz4-compresses them as they
/// arrive, so the uncompressed profile never exists in memory as a whole.
pub struct CompressedProtobufSerializer {
    buffer: Vec<u8>,
    zipper: FrameEncoder<Vec<u8>>,
}

impl CompressedProtobufSerializer {
    pub fn encode(&mut self, item: impl prost::Message) -> anyhow::Result<()> {
        item.encode(&mut self.buffer)?;
        self.zipper.write_all(&self.buffer)?;
        self.buffer.clear();
        Ok(())
    }

    pub fn finish(self) -> anyhow::Result<Vec<u8>> {
        Ok(self.zipper.finish()?)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        // The scratch buffer only ever holds one message.
        let buffer = Vec::with_capacity(capacity.min(4096));
        let zipper = FrameEncoder::new(Vec::with_capacity(capacity));
        Self { buffer, zipper }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pprof::sliced_proto::ProfileStringTableEntry;
    use std::io::Read;

    #[test]
    fn output_is_an_lz4_frame() {
        let mut encoder = CompressedProtobufSerializer::with_capacity(64);
        encoder
            .encode(ProfileStringTableEntry::from("wall-time"))
            .unwrap();
        let compressed = encoder.finish().unwrap();

        let mut decoded = Vec::new();
        lz4_flex::frame::FrameDecoder::new(compressed.as_slice())
            .read_to_end(&mut decoded)
            .unwrap();
        // Field 6, length-delimited, then the bytes.
        assert_eq!(decoded[0], (6 << 3) | 2);
        assert_eq!(usize::from(decoded[1]), "wall-time".len());
        assert_eq!(&decoded[2..], b"wall-time");
    }
}
