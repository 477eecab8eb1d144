//! Secondary-path impulse response loader (spec §6): a binary file of
//! little-endian IEEE-754 32-bit floats, up to `MAX_TAPS` taps. No extra
//! crate is pulled in for this — the teacher's own convolution code
//! (`rf-dsp`) decodes raw bytes the same way for its IR cache, via
//! `f32::from_le_bytes` chunks.

use std::path::Path;

use anc_dsp::convolution::MAX_TAPS;

use crate::error::IoResult;

/// Fallback impulse response used when no file is configured or the file
/// cannot be read: `h[n] = 0.5 * exp(-n/100)` for `n` in `0..MAX_TAPS`
/// (spec §6).
pub fn fallback_impulse_response() -> Vec<f64> {
    (0..MAX_TAPS).map(|n| 0.5 * (-(n as f64) / 100.0).exp()).collect()
}

/// Load a little-endian f32 impulse response, truncated to `MAX_TAPS`
/// taps. Falls back to [`fallback_impulse_response`] (with a `warn!` log)
/// on a missing file or a length that isn't a multiple of 4 bytes.
pub fn load_impulse_response<P: AsRef<Path>>(path: Option<P>) -> Vec<f64> {
    let Some(path) = path else {
        log::warn!("no secondary-path impulse response configured, using exponential-decay fallback");
        return fallback_impulse_response();
    };
    match try_load(path.as_ref()) {
        Ok(ir) => ir,
        Err(err) => {
            log::warn!("failed to load impulse response {}: {err}, using exponential-decay fallback", path.as_ref().display());
            fallback_impulse_response()
        }
    }
}

fn try_load(path: &Path) -> IoResult<Vec<f64>> {
    let bytes = std::fs::read(path)?;
    let taps: Vec<f64> = bytes
        .chunks_exact(4)
        .take(MAX_TAPS)
        .map(|chunk| f32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]) as f64)
        .collect();
    Ok(taps)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn fallback_matches_exponential_decay() {
        let ir = fallback_impulse_response();
        assert_eq!(ir.len(), MAX_TAPS);
        assert!((ir[0] - 0.5).abs() < 1e-12);
        assert!(ir[100] < ir[0]);
    }

    #[test]
    fn missing_path_falls_back() {
        let ir = load_impulse_response::<&str>(None);
        assert_eq!(ir.len(), MAX_TAPS);
    }

    #[test]
    fn nonexistent_file_falls_back() {
        let ir = load_impulse_response(Some("/nonexistent/ir.bin"));
        assert_eq!(ir.len(), MAX_TAPS);
    }

    #[test]
    fn loads_little_endian_floats_from_file() {
        let mut file = NamedTempFile::new().unwrap();
        for v in [1.0f32, 0.5, 0.25] {
            file.write_all(&v.to_le_bytes()).unwrap();
        }
        let ir = load_impulse_response(Some(file.path()));
        assert_eq!(ir.len(), 3);
        assert!((ir[0] - 1.0).abs() < 1e-6);
        assert!((ir[1] - 0.5).abs() < 1e-6);
        assert!((ir[2] - 0.25).abs() < 1e-6);
    }

    #[test]
    fn truncates_to_max_taps() {
        let mut file = NamedTempFile::new().unwrap();
        for _ in 0..(MAX_TAPS + 50) {
            file.write_all(&0.1f32.to_le_bytes()).unwrap();
        }
        let ir = load_impulse_response(Some(file.path()));
        assert_eq!(ir.len(), MAX_TAPS);
    }
}
