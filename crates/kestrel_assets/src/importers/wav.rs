//! WAV audio importer
//!
//! Reads uncompressed PCM RIFF files. Chunks other than `fmt ` and `data`
//! are skipped.

use super::{asset_name, read_bytes, Importer};
use crate::data::{AssetData, AudioData};
use crate::error::{AssetError, Result};
use std::path::Path;

const PCM_FORMAT: u16 = 1;

/// Imports `.wav` files
#[derive(Clone, Copy, Debug, Default)]
pub struct WavImporter;

impl Importer for WavImporter {
    fn load(&self, path: &Path) -> Result<Vec<AssetData>> {
        let bytes = read_bytes(path)?;
        let audio = parse(&bytes, asset_name(path))
            .map_err(|detail| AssetError::parse(path.display().to_string(), detail))?;
        Ok(vec![AssetData::Audio(audio)])
    }

    fn supported_extensions(&self) -> &[&str] {
        &["wav"]
    }

    fn name(&self) -> &'static str {
        "wav"
    }
}

fn u16_at(bytes: &[u8], at: usize) -> Option<u16> {
    Some(u16::from_le_bytes(bytes.get(at..at + 2)?.try_into().ok()?))
}

fn u32_at(bytes: &[u8], at: usize) -> Option<u32> {
    Some(u32::from_le_bytes(bytes.get(at..at + 4)?.try_into().ok()?))
}

fn parse(bytes: &[u8], name: String) -> std::result::Result<AudioData, String> {
    if bytes.len() < 12 || &bytes[0..4] != b"RIFF" || &bytes[8..12] != b"WAVE" {
        return Err("missing RIFF/WAVE header".into());
    }

    let mut format = None;
    let mut samples = None;
    let mut at = 12;
    while at + 8 <= bytes.len() {
        let id = &bytes[at..at + 4];
        let size = u32_at(bytes, at + 4).ok_or("truncated chunk header")? as usize;
        let body = at + 8;
        let end = body.checked_add(size).ok_or("chunk size overflow")?;
        match id {
            b"fmt " => {
                let audio_format = u16_at(bytes, body).ok_or("truncated fmt chunk")?;
                if audio_format != PCM_FORMAT {
                    return Err(format!("unsupported audio format {audio_format}"));
                }
                let channels = u16_at(bytes, body + 2).ok_or("truncated fmt chunk")?;
                let frequency = u32_at(bytes, body + 4).ok_or("truncated fmt chunk")?;
                let sample_bits = u16_at(bytes, body + 14).ok_or("truncated fmt chunk")?;
                format = Some((channels, frequency, sample_bits));
            }
            b"data" => {
                let data = bytes.get(body..end).ok_or("data chunk runs past end of file")?;
                samples = Some(data.to_vec());
            }
            _ => {}
        }
        // Chunks are padded to an even length.
        at = end + (size & 1);
    }

    let (channels, frequency, sample_bits) = format.ok_or("missing fmt chunk")?;
    let samples = samples.ok_or("missing data chunk")?;
    Ok(AudioData {
        name,
        channels,
        sample_bits,
        frequency,
        samples,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn wav_bytes(samples: &[u8]) -> Vec<u8> {
        let mut out = Vec::new();
        out.extend_from_slice(b"RIFF");
        out.extend_from_slice(&(36 + samples.len() as u32).to_le_bytes());
        out.extend_from_slice(b"WAVE");
        out.extend_from_slice(b"fmt ");
        out.extend_from_slice(&16u32.to_le_bytes());
        out.extend_from_slice(&PCM_FORMAT.to_le_bytes());
        out.extend_from_slice(&2u16.to_le_bytes()); // channels
        out.extend_from_slice(&44100u32.to_le_bytes());
        out.extend_from_slice(&(44100u32 * 4).to_le_bytes());
        out.extend_from_slice(&4u16.to_le_bytes());
        out.extend_from_slice(&16u16.to_le_bytes());
        out.extend_from_slice(b"LIST");
        out.extend_from_slice(&3u32.to_le_bytes());
        out.extend_from_slice(&[1, 2, 3, 0]);
        out.extend_from_slice(b"data");
        out.extend_from_slice(&(samples.len() as u32).to_le_bytes());
        out.extend_from_slice(samples);
        out
    }

    #[test]
    fn test_parse_pcm() {
        let audio = parse(&wav_bytes(&[1, 2, 3, 4]), "ding".into()).unwrap();
        assert_eq!(audio.channels, 2);
        assert_eq!(audio.frequency, 44100);
        assert_eq!(audio.sample_bits, 16);
        assert_eq!(audio.samples, vec![1, 2, 3, 4]);
    }

    #[test]
    fn test_parse_rejects_bad_input() {
        assert!(parse(b"RIFX", "x".into()).is_err());

        let mut truncated = wav_bytes(&[1, 2, 3, 4]);
        truncated.truncate(truncated.len() - 2);
        assert!(parse(&truncated, "x".into()).is_err());
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ding.wav");
        std::fs::write(&path, wav_bytes(&[9, 9])).unwrap();

        let records = WavImporter.load(&path).unwrap();
        assert_eq!(records[0].name(), "ding");
    }
}
