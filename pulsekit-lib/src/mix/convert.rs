//! Sample conversions between the unsigned byte domain (128 = zero) and the
//! signed accumulator domain.
//!
//! All narrowing wraps. Nothing here clamps or saturates.

/// Offset an unsigned sample byte into the signed domain.
pub(crate) fn to_signed(byte: u8) -> i8 {
    byte.wrapping_sub(128) as i8
}

/// Offset and scale a sample byte, truncating toward zero and wrapping into `i8`.
pub(crate) fn attenuate(byte: u8, gain: f64) -> i8 {
    let scaled = f64::from(i32::from(byte) - 128) * gain;
    scaled as i32 as i8
}

/// Offset a signed accumulator value back into the unsigned byte domain.
pub(crate) fn to_unsigned(sample: i8) -> u8 {
    (sample as u8).wrapping_add(128)
}

/// Convert `input` into `acc[..input.len()]`, scaling by `gain`.
#[allow(clippy::float_cmp)]
pub(crate) fn load(input: &[u8], gain: f64, acc: &mut [i8]) {
    if gain == 1.0 {
        for (dst, &byte) in acc.iter_mut().zip(input) {
            *dst = to_signed(byte);
        }
    } else {
        for (dst, &byte) in acc.iter_mut().zip(input) {
            *dst = attenuate(byte, gain);
        }
    }
}

/// Scale `input` by `gain` and add it onto `acc[..input.len()]` with wrapping.
#[allow(clippy::float_cmp)]
pub(crate) fn accumulate(input: &[u8], gain: f64, acc: &mut [i8]) {
    if gain == 1.0 {
        for (dst, &byte) in acc.iter_mut().zip(input) {
            *dst = dst.wrapping_add(to_signed(byte));
        }
    } else {
        for (dst, &byte) in acc.iter_mut().zip(input) {
            *dst = dst.wrapping_add(attenuate(byte, gain));
        }
    }
}
