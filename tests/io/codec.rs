use glam::*;
use splat_editor::{Error, SPLAT_RECORD_BYTES, Splat, SplatPod, codec};

use crate::common::given;

#[test]
fn test_splat_record_bytes_should_be_32() {
    assert_eq!(SPLAT_RECORD_BYTES, 32);
}

#[test]
fn test_pack_and_unpack_should_round_trip_within_quantization_error() {
    let splats = given::splats();
    let mut bytes = vec![0; splats.len() * SPLAT_RECORD_BYTES];

    for (i, splat) in splats.iter().enumerate() {
        codec::pack(&mut bytes, i, splat).expect("pack");
    }

    for (i, splat) in splats.iter().enumerate() {
        let unpacked = codec::unpack(&bytes, i).expect("unpack");

        assert_eq!(unpacked.pos, splat.pos);
        assert_eq!(unpacked.scale, splat.scale);
        assert_eq!(unpacked.color, splat.color);
        assert!(
            Vec4::from(unpacked.rot).abs_diff_eq(Vec4::from(splat.rot), 1.0 / 128.0),
            "{:?} != {:?}",
            unpacked.rot,
            splat.rot
        );
    }
}

#[test]
fn test_pack_should_write_flipped_little_endian_layout() {
    let splat = Splat {
        pos: vec3(1.0, 2.0, 3.0),
        scale: vec3(0.5, 0.25, 0.125),
        color: U8Vec4::new(10, 20, 30, 40),
        rot: Quat::from_xyzw(0.5, 0.0, 0.0, 0.0),
    };
    let mut bytes = vec![0; SPLAT_RECORD_BYTES];

    codec::pack(&mut bytes, 0, &splat).expect("pack");

    assert_eq!(&bytes[0..4], &1.0f32.to_le_bytes());
    assert_eq!(&bytes[4..8], &(-2.0f32).to_le_bytes());
    assert_eq!(&bytes[8..12], &3.0f32.to_le_bytes());
    assert_eq!(&bytes[12..16], &0.5f32.to_le_bytes());
    assert_eq!(&bytes[16..20], &0.25f32.to_le_bytes());
    assert_eq!(&bytes[20..24], &0.125f32.to_le_bytes());
    assert_eq!(&bytes[24..28], &[10, 20, 30, 40]);
    assert_eq!(&bytes[28..32], &[128, 64, 128, 128]);
}

#[test]
fn test_pack_when_rotation_is_one_should_saturate_at_255() {
    let pod = SplatPod::from_splat(&Splat::new(Vec3::ZERO));

    assert_eq!(pod.rot, [255, 128, 128, 128]);
}

#[test]
fn test_pack_when_rotation_is_not_finite_should_encode_zero() {
    let splat = Splat {
        rot: Quat::from_xyzw(f32::NAN, 0.0, f32::INFINITY, 1.0),
        ..Splat::default()
    };

    let pod = SplatPod::from_splat(&splat);

    assert_eq!(pod.rot, [255, 128, 128, 128]);
}

#[test]
fn test_unpack_should_flip_y_and_rotation_signs() {
    let pod = SplatPod {
        pos: [1.0, 2.0, 3.0],
        scale: [1.0; 3],
        color: [0; 4],
        rot: [128, 64, 192, 0],
    };

    let splat = bytemuck::pod_read_unaligned::<SplatPod>(bytemuck::bytes_of(&pod)).to_splat();

    assert_eq!(splat.pos, vec3(1.0, -2.0, 3.0));
    assert_eq!(splat.rot, Quat::from_xyzw(0.5, 0.5, 1.0, 0.0));
}

#[test]
fn test_unpack_when_buffer_is_misaligned_should_return_error() {
    let bytes = vec![0; SPLAT_RECORD_BYTES + 1];

    assert!(matches!(
        codec::unpack(&bytes, 0),
        Err(Error::MisalignedBuffer { len: 33, record: 32 })
    ));
    assert!(matches!(
        codec::unpack_all(&bytes),
        Err(Error::MisalignedBuffer { .. })
    ));
}

#[test]
fn test_unpack_when_index_is_out_of_bounds_should_return_error() {
    let bytes = codec::pack_all(&given::splats());

    assert!(matches!(
        codec::unpack(&bytes, 2),
        Err(Error::RecordOutOfBounds { index: 2, count: 2 })
    ));
}

#[test]
fn test_pack_when_index_is_out_of_bounds_should_leave_buffer_untouched() {
    let mut bytes = vec![0; SPLAT_RECORD_BYTES];

    assert!(matches!(
        codec::pack(&mut bytes, 1, &given::splat_with_seed(1)),
        Err(Error::RecordOutOfBounds { index: 1, count: 1 })
    ));
    assert!(bytes.iter().all(|byte| *byte == 0));
}

#[test]
fn test_pack_all_and_unpack_all_should_preserve_order() {
    let splats = given::splats_a();

    let bytes = codec::pack_all(&splats);
    let unpacked = codec::unpack_all(&bytes).expect("unpack_all");

    assert_eq!(bytes.len(), 3 * SPLAT_RECORD_BYTES);
    assert_eq!(codec::record_count(&bytes).expect("record_count"), 3);
    assert_eq!(given::positions(&unpacked), given::positions(&splats));
}

#[test]
fn test_unpack_all_when_buffer_is_empty_should_return_no_splats() {
    assert_eq!(codec::unpack_all(&[]).expect("unpack_all"), Vec::new());
}
