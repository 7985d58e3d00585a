use std::io::{BufRead, Write};

use glam::*;

use crate::{Error, Splat, codec, quat};

/// The zeroth order spherical harmonics coefficient.
const SH_C0: f32 = 0.2820948;

/// The most vertices reserved up front, the header count is untrusted.
const MAX_PREALLOCATED_VERTICES: usize = 1 << 20;

/// The PLY data format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlyFormat {
    Ascii,
    BinaryLittleEndian,
}

/// The PLY scalar property types.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PlyScalar {
    I8,
    U8,
    I16,
    U16,
    I32,
    U32,
    F32,
    F64,
}

impl PlyScalar {
    fn parse(name: &str) -> Result<Self, Error> {
        match name {
            "char" | "int8" => Ok(Self::I8),
            "uchar" | "uint8" => Ok(Self::U8),
            "short" | "int16" => Ok(Self::I16),
            "ushort" | "uint16" => Ok(Self::U16),
            "int" | "int32" => Ok(Self::I32),
            "uint" | "uint32" => Ok(Self::U32),
            "float" | "float32" => Ok(Self::F32),
            "double" | "float64" => Ok(Self::F64),
            _ => Err(Error::PlyUnsupportedProperty(name.to_string())),
        }
    }

    fn size(self) -> usize {
        match self {
            Self::I8 | Self::U8 => 1,
            Self::I16 | Self::U16 => 2,
            Self::I32 | Self::U32 | Self::F32 => 4,
            Self::F64 => 8,
        }
    }

    fn is_float(self) -> bool {
        matches!(self, Self::F32 | Self::F64)
    }

    /// Read a little-endian value, `bytes` must be exactly [`PlyScalar::size`] long.
    fn read_le(self, bytes: &[u8]) -> f64 {
        let mut buf = [0; 8];
        buf[..bytes.len()].copy_from_slice(bytes);

        match self {
            Self::I8 => buf[0] as i8 as f64,
            Self::U8 => buf[0] as f64,
            Self::I16 => i16::from_le_bytes([buf[0], buf[1]]) as f64,
            Self::U16 => u16::from_le_bytes([buf[0], buf[1]]) as f64,
            Self::I32 => i32::from_le_bytes([buf[0], buf[1], buf[2], buf[3]]) as f64,
            Self::U32 => u32::from_le_bytes([buf[0], buf[1], buf[2], buf[3]]) as f64,
            Self::F32 => f32::from_le_bytes([buf[0], buf[1], buf[2], buf[3]]) as f64,
            Self::F64 => f64::from_le_bytes(buf),
        }
    }

    /// Parse an ASCII value.
    fn parse_ascii(self, token: &str) -> Result<f64, Error> {
        match self {
            Self::F32 => Ok(token.parse::<f32>()? as f64),
            _ => Ok(token.parse::<f64>()?),
        }
    }
}

/// The splat field a PLY vertex property maps to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SplatField {
    Pos(usize),
    /// Rotation in the in-memory convention, `[x, y, z, w]`.
    Rot(usize),
    /// Rotation in the on-disk convention, `[w, x, y, z]`.
    DiskRot(usize),
    Scale(usize),
    LogScale(usize),
    Color(usize),
    ShDc(usize),
    Opacity,
    Ignored,
}

impl SplatField {
    fn from_name(name: &str) -> Self {
        match name {
            "x" => Self::Pos(0),
            "y" => Self::Pos(1),
            "z" => Self::Pos(2),
            "qx" => Self::Rot(0),
            "qy" => Self::Rot(1),
            "qz" => Self::Rot(2),
            "qw" => Self::Rot(3),
            "rot_0" => Self::DiskRot(0),
            "rot_1" => Self::DiskRot(1),
            "rot_2" => Self::DiskRot(2),
            "rot_3" => Self::DiskRot(3),
            "sx" => Self::Scale(0),
            "sy" => Self::Scale(1),
            "sz" => Self::Scale(2),
            "scale_0" => Self::LogScale(0),
            "scale_1" => Self::LogScale(1),
            "scale_2" => Self::LogScale(2),
            "red" | "r" => Self::Color(0),
            "green" | "g" => Self::Color(1),
            "blue" | "b" => Self::Color(2),
            "alpha" | "a" => Self::Color(3),
            "f_dc_0" => Self::ShDc(0),
            "f_dc_1" => Self::ShDc(1),
            "f_dc_2" => Self::ShDc(2),
            "opacity" => Self::Opacity,
            _ => Self::Ignored,
        }
    }

    /// Whether the field only appears in the on-disk 3D Gaussian splatting layout.
    fn is_disk_frame(self) -> bool {
        matches!(
            self,
            Self::DiskRot(..) | Self::LogScale(..) | Self::ShDc(..) | Self::Opacity
        )
    }
}

/// A PLY vertex property.
#[derive(Debug, Clone, PartialEq)]
struct PlyProperty {
    name: String,
    ty: PlyScalar,
    field: SplatField,
}

/// The parsed PLY header.
#[derive(Debug, Clone, PartialEq)]
pub struct PlyHeader {
    /// The data format.
    pub format: PlyFormat,

    /// The number of vertices.
    pub vertex_count: usize,

    /// The vertex properties.
    properties: Vec<PlyProperty>,
}

impl PlyHeader {
    /// Read a PLY header.
    pub fn read(reader: &mut impl BufRead) -> Result<Self, Error> {
        let mut line = String::new();
        reader.read_line(&mut line)?;
        if line.as_str().trim().to_lowercase() != "ply" {
            return Err(Error::NotPly);
        }

        let mut format = None;
        let mut vertex_count = None;
        let mut properties = Vec::new();
        let mut in_vertex = false;

        loop {
            let mut line = String::new();
            if reader.read_line(&mut line)? == 0 {
                return Err(Error::PlyHeaderNotFound);
            }

            let tokens = line.split_whitespace().collect::<Vec<_>>();
            match tokens.as_slice() {
                ["end_header", ..] => break,
                ["format", "ascii", ..] => format = Some(PlyFormat::Ascii),
                ["format", "binary_little_endian", ..] => {
                    format = Some(PlyFormat::BinaryLittleEndian)
                }
                ["format", other, ..] => {
                    return Err(Error::PlyUnsupportedFormat(other.to_string()));
                }
                ["element", "vertex", count, ..] => {
                    vertex_count = Some(count.parse::<usize>()?);
                    in_vertex = true;
                }
                ["element", ..] => in_vertex = false,
                ["property", "list", ..] if in_vertex => {
                    return Err(Error::PlyUnsupportedProperty("list".to_string()));
                }
                ["property", ty, name, ..] if in_vertex => properties.push(PlyProperty {
                    name: name.to_string(),
                    ty: PlyScalar::parse(ty)?,
                    field: SplatField::from_name(name),
                }),
                _ => {}
            }
        }

        Ok(Self {
            format: format.ok_or_else(|| Error::PlyUnsupportedFormat("missing".to_string()))?,
            vertex_count: vertex_count.ok_or(Error::PlyVertexCountNotFound)?,
            properties,
        })
    }

    /// Get the names of the vertex properties.
    pub fn property_names(&self) -> impl Iterator<Item = &str> {
        self.properties.iter().map(|property| property.name.as_str())
    }

    /// Get the size of a binary vertex row.
    fn row_size(&self) -> usize {
        self.properties.iter().map(|property| property.ty.size()).sum()
    }

    /// Whether the vertices are in the on-disk 3D Gaussian splatting layout.
    fn is_disk_frame(&self) -> bool {
        self.properties
            .iter()
            .any(|property| property.field.is_disk_frame())
    }

    /// Build a splat from the values of one vertex.
    fn splat_from_values(&self, values: &[f64]) -> Splat {
        let mut splat = Splat::default();
        let mut rot = [0.0, 0.0, 0.0, 1.0];
        let mut disk_rot = [1.0, 0.0, 0.0, 0.0];

        for (property, value) in self.properties.iter().zip(values) {
            let value = *value as f32;
            let color = |value: f32| (value * 255.0).round().clamp(0.0, 255.0) as u8;

            match property.field {
                SplatField::Pos(i) => splat.pos[i] = value,
                SplatField::Rot(i) => rot[i] = value,
                SplatField::DiskRot(i) => disk_rot[i] = value,
                SplatField::Scale(i) => splat.scale[i] = value,
                SplatField::LogScale(i) => splat.scale[i] = value.exp(),
                SplatField::Color(i) if property.ty.is_float() => splat.color[i] = color(value),
                SplatField::Color(i) => splat.color[i] = value.clamp(0.0, 255.0) as u8,
                SplatField::ShDc(i) => splat.color[i] = color(0.5 + value * SH_C0),
                SplatField::Opacity => splat.color[3] = color(1.0 / (1.0 + (-value).exp())),
                SplatField::Ignored => {}
            }
        }

        match self.is_disk_frame() {
            true => {
                let [w, x, y, z] = disk_rot;
                splat.pos.y = -splat.pos.y;
                splat.rot = quat::normalize(Quat::from_xyzw(-x, y, -z, w));
            }
            false => splat.rot = Quat::from_array(rot),
        }

        splat
    }
}

/// Read the splats of a PLY file.
///
/// Both the ASCII layout written by [`write_ply_ascii`] and the 3D Gaussian splatting layout with
/// `rot_*`, `scale_*`, `f_dc_*`, and `opacity` are supported. The latter is converted from the
/// on-disk convention, same as a splat record.
pub fn read_ply(reader: &mut impl BufRead) -> Result<Vec<Splat>, Error> {
    let header = PlyHeader::read(reader)?;

    log::debug!(
        "Reading {} PLY vertices with properties {:?}",
        header.vertex_count,
        header.property_names().collect::<Vec<_>>()
    );

    match header.format {
        PlyFormat::Ascii => read_ply_ascii_vertices(reader, &header),
        PlyFormat::BinaryLittleEndian => read_ply_binary_vertices(reader, &header),
    }
}

fn read_ply_ascii_vertices(
    reader: &mut impl BufRead,
    header: &PlyHeader,
) -> Result<Vec<Splat>, Error> {
    let mut splats = Vec::with_capacity(header.vertex_count.min(MAX_PREALLOCATED_VERTICES));
    let mut values = Vec::with_capacity(header.properties.len());
    let mut line = String::new();

    while splats.len() < header.vertex_count {
        line.clear();
        if reader.read_line(&mut line)? == 0 {
            return Err(Error::PlyValueMissing(splats.len()));
        }

        if line.trim().is_empty() {
            continue;
        }

        values.clear();
        let mut tokens = line.split_whitespace();
        for property in header.properties.iter() {
            let token = tokens.next().ok_or(Error::PlyValueMissing(splats.len()))?;
            values.push(property.ty.parse_ascii(token)?);
        }

        splats.push(header.splat_from_values(&values));
    }

    Ok(splats)
}

fn read_ply_binary_vertices(
    reader: &mut impl BufRead,
    header: &PlyHeader,
) -> Result<Vec<Splat>, Error> {
    let mut splats = Vec::with_capacity(header.vertex_count.min(MAX_PREALLOCATED_VERTICES));
    let mut row = vec![0; header.row_size()];
    let mut values = Vec::with_capacity(header.properties.len());

    for _ in 0..header.vertex_count {
        reader.read_exact(&mut row)?;

        values.clear();
        let mut offset = 0;
        for property in header.properties.iter() {
            let size = property.ty.size();
            values.push(property.ty.read_le(&row[offset..offset + size]));
            offset += size;
        }

        splats.push(header.splat_from_values(&values));
    }

    Ok(splats)
}

/// Write the splats as an ASCII PLY file.
///
/// Each line is `x y z qx qy qz qw sx sy sz red green blue alpha` in the in-memory convention.
pub fn write_ply_ascii(writer: &mut impl Write, splats: &[Splat]) -> Result<(), Error> {
    writeln!(writer, "ply")?;
    writeln!(writer, "format ascii 1.0")?;
    writeln!(writer, "element vertex {}", splats.len())?;
    writeln!(writer, "property float x")?;
    writeln!(writer, "property float y")?;
    writeln!(writer, "property float z")?;
    writeln!(writer, "property float qx")?;
    writeln!(writer, "property float qy")?;
    writeln!(writer, "property float qz")?;
    writeln!(writer, "property float qw")?;
    writeln!(writer, "property float sx")?;
    writeln!(writer, "property float sy")?;
    writeln!(writer, "property float sz")?;
    writeln!(writer, "property uchar red")?;
    writeln!(writer, "property uchar green")?;
    writeln!(writer, "property uchar blue")?;
    writeln!(writer, "property uchar alpha")?;
    writeln!(writer, "end_header")?;

    for Splat {
        pos,
        scale,
        color,
        rot,
    } in splats
    {
        writeln!(
            writer,
            "{} {} {} {} {} {} {} {} {} {} {} {} {} {}",
            pos.x,
            pos.y,
            pos.z,
            rot.x,
            rot.y,
            rot.z,
            rot.w,
            scale.x,
            scale.y,
            scale.z,
            color.x,
            color.y,
            color.z,
            color.w,
        )?;
    }

    Ok(())
}

/// Convert the splats to ASCII PLY text.
pub fn splats_to_ply_text(splats: &[Splat]) -> Result<String, Error> {
    let mut bytes = Vec::new();
    write_ply_ascii(&mut bytes, splats)?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

/// Convert a splat buffer to ASCII PLY text.
pub fn splat_buffer_to_text(bytes: &[u8]) -> Result<String, Error> {
    splats_to_ply_text(&codec::unpack_all(bytes)?)
}

/// Convert PLY text records to a splat buffer.
pub fn text_records_to_splat_buffer(text: &str) -> Result<Vec<u8>, Error> {
    Ok(codec::pack_all(&read_ply(&mut text.as_bytes())?))
}
