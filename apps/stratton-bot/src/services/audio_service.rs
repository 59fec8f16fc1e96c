use crate::error::{BotError, BotResult};
use ogg::reading::PacketReader;
use std::io::Cursor;

/// Sample rate handed to speech recognition.
pub const TARGET_SAMPLE_RATE: u32 = 16_000;

// 120 ms at 48 kHz, the largest Opus frame.
const MAX_FRAME_SAMPLES: usize = 5_760;
const OPUS_HEAD: &[u8] = b"OpusHead";
const OPUS_TAGS: &[u8] = b"OpusTags";

/// Mono linear PCM.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Waveform {
    pub sample_rate: u32,
    pub samples: Vec<i16>,
}

impl Waveform {
    /// Little-endian 16-bit samples, the LINEAR16 layout.
    pub fn to_le_bytes(&self) -> Vec<u8> {
        self.samples.iter().flat_map(|s| s.to_le_bytes()).collect()
    }

    pub fn duration_secs(&self) -> f32 {
        self.samples.len() as f32 / self.sample_rate as f32
    }
}

pub trait AudioDecoder: Send + Sync {
    fn decode(&self, bytes: &[u8]) -> BotResult<Waveform>;
}

/// Decodes Telegram voice notes (Opus in an Ogg container).
#[derive(Debug, Default, Clone)]
pub struct OggOpusDecoder;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct OpusHeader {
    channels: u8,
    pre_skip: u16,
}

fn parse_opus_head(packet: &[u8]) -> BotResult<OpusHeader> {
    if packet.len() < 19 || !packet.starts_with(OPUS_HEAD) {
        return Err(BotError::AudioDecodeError(
            "stream does not start with an OpusHead packet".into(),
        ));
    }
    let channels = packet[9];
    if channels == 0 {
        return Err(BotError::AudioDecodeError("OpusHead declares zero channels".into()));
    }
    Ok(OpusHeader {
        channels,
        pre_skip: u16::from_le_bytes([packet[10], packet[11]]),
    })
}

fn decode_err(e: impl std::fmt::Display) -> BotError {
    BotError::AudioDecodeError(e.to_string())
}

impl AudioDecoder for OggOpusDecoder {
    fn decode(&self, bytes: &[u8]) -> BotResult<Waveform> {
        let mut reader = PacketReader::new(Cursor::new(bytes));

        let head = reader
            .read_packet()
            .map_err(decode_err)?
            .ok_or_else(|| BotError::AudioDecodeError("no Ogg pages found".into()))?;
        let header = parse_opus_head(&head.data)?;

        // libopus downmixes to the requested channel count.
        let mut decoder = opus::Decoder::new(TARGET_SAMPLE_RATE, opus::Channels::Mono)
            .map_err(decode_err)?;
        let mut frame = vec![0i16; MAX_FRAME_SAMPLES];
        let mut samples = Vec::new();

        let mut expect_tags = true;
        while let Some(packet) = reader.read_packet().map_err(decode_err)? {
            if expect_tags {
                expect_tags = false;
                if packet.data.starts_with(OPUS_TAGS) {
                    continue;
                }
            }
            let n = decoder
                .decode(&packet.data, &mut frame, false)
                .map_err(decode_err)?;
            samples.extend_from_slice(&frame[..n]);
        }

        // Pre-skip is expressed at 48 kHz.
        let skip = (header.pre_skip as usize * TARGET_SAMPLE_RATE as usize) / 48_000;
        if samples.len() <= skip {
            return Err(BotError::AudioDecodeError("voice message contains no audio".into()));
        }
        samples.drain(..skip);

        tracing::debug!(
            "Decoded {} channel(s) Opus into {} samples",
            header.channels,
            samples.len()
        );

        Ok(Waveform {
            sample_rate: TARGET_SAMPLE_RATE,
            samples,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn garbage_input_is_a_decode_error() {
        let decoder = OggOpusDecoder;
        for input in [&b""[..], &b"definitely not audio"[..], &[0u8; 64][..]] {
            assert!(matches!(
                decoder.decode(input),
                Err(BotError::AudioDecodeError(_))
            ));
        }
    }

    const PRE_SKIP: u16 = 312;
    // 20 ms at 48 kHz.
    const FRAME_48K: usize = 960;

    /// Encodes `frames` 20 ms frames of a 440 Hz tone into an Ogg/Opus stream
    /// laid out the way Telegram sends voice notes.
    fn encode_voice(channels: opus::Channels, frames: usize) -> Vec<u8> {
        use ogg::writing::{PacketWriteEndInfo, PacketWriter};

        let count: u8 = match channels {
            opus::Channels::Mono => 1,
            opus::Channels::Stereo => 2,
        };
        let mut head = OPUS_HEAD.to_vec();
        head.push(1);
        head.push(count);
        head.extend_from_slice(&PRE_SKIP.to_le_bytes());
        head.extend_from_slice(&48_000u32.to_le_bytes());
        head.extend_from_slice(&0i16.to_le_bytes());
        head.push(0);

        let vendor = b"stratton";
        let mut tags = OPUS_TAGS.to_vec();
        tags.extend_from_slice(&(vendor.len() as u32).to_le_bytes());
        tags.extend_from_slice(vendor);
        tags.extend_from_slice(&0u32.to_le_bytes());

        let mut encoder =
            opus::Encoder::new(48_000, channels, opus::Application::Voip).unwrap();
        let mut out = Vec::new();
        let mut writer = PacketWriter::new(&mut out);
        writer.write_packet(head, 1, PacketWriteEndInfo::EndPage, 0).unwrap();
        writer.write_packet(tags, 1, PacketWriteEndInfo::EndPage, 0).unwrap();

        let mut packet = vec![0u8; 4_000];
        for i in 0..frames {
            let pcm: Vec<i16> = (0..FRAME_48K)
                .flat_map(|n| {
                    let t = (i * FRAME_48K + n) as f32 / 48_000.0;
                    let s = ((t * 440.0 * std::f32::consts::TAU).sin() * 8_000.0) as i16;
                    std::iter::repeat(s).take(count as usize)
                })
                .collect();
            let len = encoder.encode(&pcm, &mut packet).unwrap();
            let end = if i + 1 == frames {
                PacketWriteEndInfo::EndStream
            } else {
                PacketWriteEndInfo::NormalPacket
            };
            let granule = ((i + 1) * FRAME_48K) as u64;
            writer.write_packet(packet[..len].to_vec(), 1, end, granule).unwrap();
        }
        drop(writer);
        out
    }

    fn expected_samples(frames: usize) -> usize {
        let per_frame = FRAME_48K * TARGET_SAMPLE_RATE as usize / 48_000;
        frames * per_frame - PRE_SKIP as usize * TARGET_SAMPLE_RATE as usize / 48_000
    }

    #[test]
    fn voice_note_decodes_to_16k_mono_after_pre_skip() {
        let stream = encode_voice(opus::Channels::Mono, 5);

        let wave = OggOpusDecoder.decode(&stream).unwrap();

        assert_eq!(wave.sample_rate, TARGET_SAMPLE_RATE);
        // 5 x 320 decoded samples minus 104 samples of pre-skip.
        assert_eq!(wave.samples.len(), expected_samples(5));
        assert_eq!(wave.samples.len(), 1_496);
        assert!(wave.samples.iter().any(|s| *s != 0));
    }

    #[test]
    fn stereo_voice_note_is_downmixed() {
        let stream = encode_voice(opus::Channels::Stereo, 3);
        let wave = OggOpusDecoder.decode(&stream).unwrap();
        assert_eq!(wave.samples.len(), expected_samples(3));
    }

    #[test]
    fn stream_with_only_headers_has_no_audio() {
        let stream = encode_voice(opus::Channels::Mono, 0);
        assert!(matches!(
            OggOpusDecoder.decode(&stream),
            Err(BotError::AudioDecodeError(_))
        ));
    }

    #[test]
    fn opus_head_is_parsed() {
        let mut head = b"OpusHead".to_vec();
        head.push(1); // version
        head.push(2); // channels
        head.extend_from_slice(&312u16.to_le_bytes());
        head.extend_from_slice(&48_000u32.to_le_bytes());
        head.extend_from_slice(&0i16.to_le_bytes());
        head.push(0);

        let header = parse_opus_head(&head).unwrap();
        assert_eq!(header.channels, 2);
        assert_eq!(header.pre_skip, 312);
    }

    #[test]
    fn non_opus_head_is_refused() {
        let mut vorbis = vec![1u8];
        vorbis.extend_from_slice(b"vorbis");
        vorbis.resize(30, 0);
        assert!(parse_opus_head(&vorbis).is_err());
    }

    #[test]
    fn waveform_serializes_little_endian() {
        let wave = Waveform {
            sample_rate: TARGET_SAMPLE_RATE,
            samples: vec![1, -2],
        };
        assert_eq!(wave.to_le_bytes(), vec![0x01, 0x00, 0xfe, 0xff]);
        assert!((wave.duration_secs() - 2.0 / 16_000.0).abs() < f32::EPSILON);
    }
}
