//! Link payload codec
//!
//! Turns snapshot text into URL-safe tokens and back. A token is the
//! compressed payload prefixed with a two-byte header (algorithm and level)
//! and base64url-encoded without padding, so decoding never needs to know
//! which algorithm produced the token. Decode failure is always detectable;
//! a damaged token yields an error, never corrupted text.

use std::io::{Read, Write};

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine as _;
use lz4::{Decoder as Lz4Decoder, EncoderBuilder as Lz4EncoderBuilder};
use zstd::{Decoder as ZstdDecoder, Encoder as ZstdEncoder};

use crate::config::CodecAlgorithm;
use crate::error::{Error, Result};

/// Compression interface for link payloads
pub trait Compressor: Send + Sync {
    /// Compress data
    fn compress(&self, data: &[u8]) -> Result<Vec<u8>>;

    /// Get the codec algorithm
    fn algorithm(&self) -> CodecAlgorithm;

    /// Get the codec level
    fn level(&self) -> i32;
}

/// Decompression interface for link payloads
pub trait Decompressor: Send + Sync {
    /// Decompress data
    fn decompress(&self, data: &[u8]) -> Result<Vec<u8>>;

    /// Get the codec algorithm
    fn algorithm(&self) -> CodecAlgorithm;
}

/// Factory for creating compressors and decompressors
pub struct CodecFactory;

impl CodecFactory {
    /// Create a new compressor based on algorithm and level
    pub fn create_compressor(algorithm: CodecAlgorithm, level: i32) -> Box<dyn Compressor> {
        match algorithm {
            CodecAlgorithm::None => Box::new(NoCompression),
            CodecAlgorithm::Lz4 => Box::new(Lz4Compression::new(level)),
            CodecAlgorithm::Zstd => Box::new(ZstdCompression::new(level)),
        }
    }

    /// Create a new decompressor based on algorithm
    pub fn create_decompressor(algorithm: CodecAlgorithm) -> Box<dyn Decompressor> {
        match algorithm {
            CodecAlgorithm::None => Box::new(NoCompression),
            CodecAlgorithm::Lz4 => Box::new(Lz4Decompression),
            CodecAlgorithm::Zstd => Box::new(ZstdDecompression),
        }
    }
}

/// No compression (passthrough)
pub struct NoCompression;

impl Compressor for NoCompression {
    fn compress(&self, data: &[u8]) -> Result<Vec<u8>> {
        Ok(data.to_vec())
    }

    fn algorithm(&self) -> CodecAlgorithm {
        CodecAlgorithm::None
    }

    fn level(&self) -> i32 {
        0
    }
}

impl Decompressor for NoCompression {
    fn decompress(&self, data: &[u8]) -> Result<Vec<u8>> {
        Ok(data.to_vec())
    }

    fn algorithm(&self) -> CodecAlgorithm {
        CodecAlgorithm::None
    }
}

/// LZ4 compression
pub struct Lz4Compression {
    level: i32,
}

impl Lz4Compression {
    /// Create a new LZ4 compressor with the specified level
    pub fn new(level: i32) -> Self {
        Self {
            level: level.clamp(0, 9),
        }
    }
}

impl Compressor for Lz4Compression {
    fn compress(&self, data: &[u8]) -> Result<Vec<u8>> {
        let mut encoder = Lz4EncoderBuilder::new()
            .level(self.level as u32)
            .build(Vec::new())
            .map_err(|e| Error::codec(format!("LZ4 encoder failed: {}", e)))?;

        encoder
            .write_all(data)
            .map_err(|e| Error::codec(format!("LZ4 compression failed: {}", e)))?;

        let (compressed, result) = encoder.finish();
        result.map_err(|e| Error::codec(format!("LZ4 compression failed: {}", e)))?;

        Ok(compressed)
    }

    fn algorithm(&self) -> CodecAlgorithm {
        CodecAlgorithm::Lz4
    }

    fn level(&self) -> i32 {
        self.level
    }
}

/// LZ4 decompression
pub struct Lz4Decompression;

impl Decompressor for Lz4Decompression {
    fn decompress(&self, data: &[u8]) -> Result<Vec<u8>> {
        let mut decoder = Lz4Decoder::new(data)
            .map_err(|e| Error::codec(format!("Invalid LZ4 payload: {}", e)))?;
        let mut decompressed = Vec::new();

        decoder
            .read_to_end(&mut decompressed)
            .map_err(|e| Error::codec(format!("Invalid LZ4 payload: {}", e)))?;

        Ok(decompressed)
    }

    fn algorithm(&self) -> CodecAlgorithm {
        CodecAlgorithm::Lz4
    }
}

/// Zstandard compression
pub struct ZstdCompression {
    level: i32,
}

impl ZstdCompression {
    /// Create a new Zstandard compressor with the specified level
    pub fn new(level: i32) -> Self {
        Self {
            level: level.clamp(0, 9),
        }
    }
}

impl Compressor for ZstdCompression {
    fn compress(&self, data: &[u8]) -> Result<Vec<u8>> {
        let mut compressed = Vec::new();
        let mut encoder = ZstdEncoder::new(&mut compressed, self.level.clamp(1, 22))
            .map_err(|e| Error::codec(format!("Zstd encoder failed: {}", e)))?;

        encoder
            .write_all(data)
            .map_err(|e| Error::codec(format!("Zstd compression failed: {}", e)))?;
        encoder
            .finish()
            .map_err(|e| Error::codec(format!("Zstd compression failed: {}", e)))?;

        Ok(compressed)
    }

    fn algorithm(&self) -> CodecAlgorithm {
        CodecAlgorithm::Zstd
    }

    fn level(&self) -> i32 {
        self.level
    }
}

/// Zstandard decompression
pub struct ZstdDecompression;

impl Decompressor for ZstdDecompression {
    fn decompress(&self, data: &[u8]) -> Result<Vec<u8>> {
        let mut decompressed = Vec::new();
        let mut decoder = ZstdDecoder::new(data)
            .map_err(|e| Error::codec(format!("Invalid Zstd payload: {}", e)))?;

        decoder
            .read_to_end(&mut decompressed)
            .map_err(|e| Error::codec(format!("Invalid Zstd payload: {}", e)))?;

        Ok(decompressed)
    }

    fn algorithm(&self) -> CodecAlgorithm {
        CodecAlgorithm::Zstd
    }
}

/// Reversible text to token transform for link-embedded snapshots.
///
/// `decode(encode(text)) == text` for any text and any configured algorithm.
#[derive(Debug, Clone)]
pub struct ShareCodec {
    algorithm: CodecAlgorithm,
    level: i32,
}

impl ShareCodec {
    /// Create a codec with the given algorithm and level
    pub fn new(algorithm: CodecAlgorithm, level: i32) -> Self {
        Self {
            algorithm,
            level: level.clamp(0, 9),
        }
    }

    /// Encode snapshot text into a URL-safe token
    pub fn encode(&self, text: &str) -> Result<String> {
        let compressor = CodecFactory::create_compressor(self.algorithm, self.level);
        let compressed = compressor.compress(text.as_bytes())?;
        let framed = util::add_header(compressed, self.algorithm, self.level);
        Ok(URL_SAFE_NO_PAD.encode(framed))
    }

    /// Decode a token back into snapshot text.
    ///
    /// The token header names the algorithm, so any token this codec family
    /// produced decodes here regardless of the configured algorithm.
    pub fn decode(&self, token: &str) -> Result<String> {
        let bytes = URL_SAFE_NO_PAD.decode(token)?;
        let (algorithm, _level, payload) = util::parse_header(&bytes)?;
        let decompressor = CodecFactory::create_decompressor(algorithm);
        let data = decompressor.decompress(payload)?;
        String::from_utf8(data).map_err(|_| Error::codec("Decoded payload is not valid UTF-8"))
    }

    /// Get the configured codec algorithm
    pub fn algorithm(&self) -> CodecAlgorithm {
        self.algorithm
    }

    /// Get the configured codec level
    pub fn level(&self) -> i32 {
        self.level
    }
}

impl Default for ShareCodec {
    fn default() -> Self {
        Self::new(CodecAlgorithm::default(), crate::config::DEFAULT_CODEC_LEVEL)
    }
}

/// Utility functions for token framing
pub mod util {
    use super::*;

    /// Prefix compressed data with its algorithm and level header
    pub fn add_header(compressed: Vec<u8>, algorithm: CodecAlgorithm, level: i32) -> Vec<u8> {
        let mut result = Vec::with_capacity(compressed.len() + 2);

        result.push(match algorithm {
            CodecAlgorithm::None => 0,
            CodecAlgorithm::Lz4 => 1,
            CodecAlgorithm::Zstd => 2,
        });
        result.push(level as u8);
        result.extend_from_slice(&compressed);

        result
    }

    /// Parse the header from framed data
    pub fn parse_header(data: &[u8]) -> Result<(CodecAlgorithm, i32, &[u8])> {
        if data.len() < 2 {
            return Err(Error::codec("Invalid token header: too short"));
        }

        let algorithm = match data[0] {
            0 => CodecAlgorithm::None,
            1 => CodecAlgorithm::Lz4,
            2 => CodecAlgorithm::Zstd,
            _ => {
                return Err(Error::codec(format!(
                    "Unknown codec algorithm: {}",
                    data[0]
                )))
            }
        };

        let level = data[1] as i32;

        Ok((algorithm, level, &data[2..]))
    }
}
