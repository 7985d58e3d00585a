use glam::*;

use crate::{Error, Splat};

/// The size of a splat record in bytes.
pub const SPLAT_RECORD_BYTES: usize = std::mem::size_of::<SplatPod>();

/// The POD representation of a splat record.
///
/// The on-disk layout is little-endian, and differs from [`Splat`] by the sign of the y position
/// and the sign of the x and z rotation components.
///
/// | Offset | Field | On-disk value |
/// |---|---|---|
/// | 0 | `pos` | `[x, -y, z]` as `f32` |
/// | 12 | `scale` | `[x, y, z]` as `f32` |
/// | 24 | `color` | `[r, g, b, a]` as `u8` |
/// | 28 | `rot` | `[w, -x, y, -z]` quantized to `u8` |
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct SplatPod {
    pub pos: [f32; 3],
    pub scale: [f32; 3],
    pub color: [u8; 4],
    pub rot: [u8; 4],
}

impl SplatPod {
    /// Convert from [`Splat`].
    pub fn from_splat(splat: &Splat) -> Self {
        let pos = [splat.pos.x, -splat.pos.y, splat.pos.z].map(to_le);
        let scale = splat.scale.to_array().map(to_le);
        let color = splat.color.to_array();
        let rot = [splat.rot.w, -splat.rot.x, splat.rot.y, -splat.rot.z].map(quantize);

        Self {
            pos,
            scale,
            color,
            rot,
        }
    }

    /// Convert to [`Splat`].
    pub fn to_splat(&self) -> Splat {
        let [x, y, z] = self.pos.map(to_le);
        let pos = vec3(x, -y, z);
        let scale = Vec3::from_array(self.scale.map(to_le));
        let color = U8Vec4::from_array(self.color);

        let [w, x, y, z] = self.rot.map(dequantize);
        let rot = Quat::from_xyzw(-x, y, -z, w);

        Splat {
            pos,
            scale,
            color,
            rot,
        }
    }
}

impl From<&Splat> for SplatPod {
    fn from(splat: &Splat) -> Self {
        Self::from_splat(splat)
    }
}

impl From<SplatPod> for Splat {
    fn from(pod: SplatPod) -> Self {
        pod.to_splat()
    }
}

/// Swap between native and little-endian byte order, a no-op on little-endian targets.
fn to_le(value: f32) -> f32 {
    f32::from_bits(u32::from_le(value.to_bits()))
}

/// Quantize a rotation component in `[-1, 1]` to a byte.
///
/// Non-finite values map to zero, and `1.0` saturates to 255.
fn quantize(value: f32) -> u8 {
    if !value.is_finite() {
        return 128;
    }

    (value.clamp(-1.0, 1.0) * 128.0 + 128.0).round().min(255.0) as u8
}

/// Dequantize a byte to a rotation component.
fn dequantize(value: u8) -> f32 {
    (value as f32 - 128.0) / 128.0
}

/// Get the number of records in a splat buffer.
pub fn record_count(bytes: &[u8]) -> Result<usize, Error> {
    match bytes.len() % SPLAT_RECORD_BYTES {
        0 => Ok(bytes.len() / SPLAT_RECORD_BYTES),
        _ => Err(Error::MisalignedBuffer {
            len: bytes.len(),
            record: SPLAT_RECORD_BYTES,
        }),
    }
}

/// Get the byte range of the record at `index`.
fn record_range(bytes: &[u8], index: usize) -> Result<std::ops::Range<usize>, Error> {
    let count = record_count(bytes)?;
    if index >= count {
        return Err(Error::RecordOutOfBounds { index, count });
    }

    let start = index * SPLAT_RECORD_BYTES;
    Ok(start..start + SPLAT_RECORD_BYTES)
}

/// Unpack the splat at record `index`.
pub fn unpack(bytes: &[u8], index: usize) -> Result<Splat, Error> {
    let range = record_range(bytes, index)?;
    Ok(bytemuck::pod_read_unaligned::<SplatPod>(&bytes[range]).to_splat())
}

/// Pack `splat` into record `index`.
pub fn pack(bytes: &mut [u8], index: usize, splat: &Splat) -> Result<(), Error> {
    let range = record_range(bytes, index)?;
    bytes[range].copy_from_slice(bytemuck::bytes_of(&SplatPod::from_splat(splat)));
    Ok(())
}

/// Unpack every record of a splat buffer.
pub fn unpack_all(bytes: &[u8]) -> Result<Vec<Splat>, Error> {
    record_count(bytes)?;

    Ok(bytes
        .chunks_exact(SPLAT_RECORD_BYTES)
        .map(|record| bytemuck::pod_read_unaligned::<SplatPod>(record).to_splat())
        .collect())
}

/// Pack the splats into a new splat buffer.
pub fn pack_all<'a>(splats: impl IntoIterator<Item = &'a Splat>) -> Vec<u8> {
    let pods = splats
        .into_iter()
        .map(SplatPod::from_splat)
        .collect::<Vec<_>>();

    bytemuck::cast_slice(&pods).to_vec()
}
