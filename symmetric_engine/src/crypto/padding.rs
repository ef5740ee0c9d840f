use rand::rngs::OsRng;
use rand::TryRngCore;

use crate::crypto::cipher_types::PaddingMode;
use crate::crypto::errors::CipherError;

/// Pads `data` to the next multiple of `block_size`. Input that is already
/// aligned (the empty buffer included) receives one full extra block, so the
/// length marker of the marker-based schemes is always unambiguous.
pub fn apply_padding(
    data: &[u8],
    block_size: usize,
    padding: PaddingMode,
) -> Result<Vec<u8>, CipherError> {
    let padding_len = block_size - data.len() % block_size;
    let mut padded = Vec::with_capacity(data.len() + padding_len);
    padded.extend_from_slice(data);

    match padding {
        PaddingMode::Zeros => padded.resize(data.len() + padding_len, 0),
        PaddingMode::AnsiX923 => {
            padded.resize(data.len() + padding_len - 1, 0);
            padded.push(padding_len as u8);
        }
        PaddingMode::Pkcs7 => padded.resize(data.len() + padding_len, padding_len as u8),
        PaddingMode::Iso10126 => {
            let mut fill = vec![0u8; padding_len - 1];
            OsRng
                .try_fill_bytes(&mut fill)
                .map_err(|e| CipherError::Io(std::io::Error::other(e)))?;
            padded.extend_from_slice(&fill);
            padded.push(padding_len as u8);
        }
    }

    Ok(padded)
}

/// Strips the padding applied by [`apply_padding`].
///
/// Zeros removal cannot tell real trailing zero bytes from fill and strips
/// them all; a known limitation of that scheme.
pub fn remove_padding(
    data: &[u8],
    block_size: usize,
    padding: PaddingMode,
) -> Result<Vec<u8>, CipherError> {
    if data.is_empty() {
        return Err(CipherError::Padding(
            "remove_padding: data is empty".into(),
        ));
    }
    if data.len() % block_size != 0 {
        return Err(CipherError::Padding(
            "remove_padding: data length is not a multiple of the block size".into(),
        ));
    }

    match padding {
        PaddingMode::Zeros => {
            let end = data.iter().rposition(|&b| b != 0).map_or(0, |i| i + 1);
            Ok(data[..end].to_vec())
        }
        PaddingMode::AnsiX923 | PaddingMode::Iso10126 => {
            let pad_len = checked_pad_len(data, block_size)?;
            Ok(data[..data.len() - pad_len].to_vec())
        }
        PaddingMode::Pkcs7 => {
            let pad_len = checked_pad_len(data, block_size)?;
            if data[data.len() - pad_len..]
                .iter()
                .any(|&b| b as usize != pad_len)
            {
                return Err(CipherError::Padding(
                    "remove_padding: corrupt PKCS7 fill byte".into(),
                ));
            }
            Ok(data[..data.len() - pad_len].to_vec())
        }
    }
}

fn checked_pad_len(data: &[u8], block_size: usize) -> Result<usize, CipherError> {
    let pad_len = data[data.len() - 1] as usize;
    if pad_len == 0 || pad_len > block_size || pad_len > data.len() {
        return Err(CipherError::Padding(format!(
            "remove_padding: invalid padding length {pad_len}"
        )));
    }
    Ok(pad_len)
}
