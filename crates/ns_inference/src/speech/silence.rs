//! A tiny silent MP3, written when no speech engine can produce audio.

/// MPEG-1 Layer III, 128 kbit/s, 44.1 kHz, mono, no CRC.
const FRAME_HEADER: [u8; 4] = [0xFF, 0xFB, 0x90, 0xC0];
/// 144 * 128000 / 44100, rounded down, no padding.
const FRAME_LEN: usize = 417;
/// Roughly one second (1152 samples per frame).
pub const DEFAULT_FRAMES: usize = 38;

/// Returns `frames` silent MP3 frames. All-zero side information means every
/// granule decodes to silence.
pub fn silent_mp3(frames: usize) -> Vec<u8> {
    let mut audio = Vec::with_capacity(frames * FRAME_LEN);
    for _ in 0..frames {
        audio.extend_from_slice(&FRAME_HEADER);
        audio.resize(audio.len() + FRAME_LEN - FRAME_HEADER.len(), 0);
    }
    audio
}
