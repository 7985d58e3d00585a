use glam::*;
use splat_editor::{ImportOptions, ObjectId, Sanitized, Splat, SplatObject, codec};

#[test]
fn test_sanitize_when_splat_is_valid_should_return_clean() {
    let splat = Splat::new(Vec3::ONE);

    assert_eq!(
        splat.sanitize(&ImportOptions::default()),
        Sanitized::Clean(splat)
    );
}

#[test]
fn test_sanitize_when_rotation_is_not_finite_should_use_identity() {
    let splat = Splat {
        rot: Quat::from_xyzw(f32::NAN, 0.0, 0.0, 1.0),
        ..Splat::default()
    };

    let Sanitized::Repaired(repaired) = splat.sanitize(&ImportOptions::default()) else {
        panic!("splat should be repaired");
    };

    assert_eq!(repaired.rot, Quat::IDENTITY);
}

#[test]
fn test_sanitize_when_rotation_is_zero_should_use_identity() {
    let bytes = codec::pack_all(&[Splat {
        rot: Quat::from_xyzw(0.0, 0.0, 0.0, 0.0),
        ..Splat::default()
    }]);
    let splat = codec::unpack(&bytes, 0).expect("unpack");

    assert_eq!(splat.rot.length(), 0.0);

    let Sanitized::Repaired(repaired) = splat.sanitize(&ImportOptions::default()) else {
        panic!("splat should be repaired");
    };

    assert_eq!(repaired.rot, Quat::IDENTITY);
}

#[test]
fn test_sanitize_when_scale_is_not_finite_or_too_small_should_clamp() {
    let splat = Splat {
        scale: vec3(f32::INFINITY, 1e-9, 2.0),
        ..Splat::default()
    };

    let repaired = splat
        .sanitize(&ImportOptions {
            min_scale: Some(1e-3),
            ..Default::default()
        })
        .splat()
        .expect("splat");

    assert_eq!(repaired.scale, vec3(1e-3, 1e-3, 2.0));
}

#[test]
fn test_sanitize_when_min_scale_is_none_should_only_replace_non_finite_scale() {
    let splat = Splat {
        scale: vec3(f32::NAN, 1e-9, 2.0),
        ..Splat::default()
    };

    let repaired = splat
        .sanitize(&ImportOptions {
            min_scale: None,
            ..Default::default()
        })
        .splat()
        .expect("splat");

    assert_eq!(
        repaired.scale,
        vec3(ImportOptions::DEFAULT_MIN_SCALE, 1e-9, 2.0)
    );
}

#[test]
fn test_sanitize_when_position_is_not_finite_should_drop_or_zero() {
    let splat = Splat::new(vec3(1.0, f32::NAN, 3.0));

    assert_eq!(
        splat.sanitize(&ImportOptions::default()),
        Sanitized::Dropped
    );

    let repaired = splat
        .sanitize(&ImportOptions {
            skip_non_finite_positions: false,
            ..Default::default()
        })
        .splat()
        .expect("splat");

    assert_eq!(repaired.pos, vec3(1.0, 0.0, 3.0));
}

#[test]
fn test_splat_object_from_splat_bytes_should_skip_corrupt_splats() {
    let splats = [
        Splat::new(Vec3::ZERO),
        Splat::new(vec3(f32::INFINITY, 0.0, 0.0)),
        Splat::new(Vec3::ONE),
    ];

    let object = SplatObject::from_splat_bytes(
        ObjectId(0),
        "corrupt.splat",
        &codec::pack_all(&splats),
        &ImportOptions::default(),
    )
    .expect("object");

    assert_eq!(object.splat_count(), 2);
    assert_eq!(object.splats()[1].pos, Vec3::ONE);
    assert_eq!(object.file_name, "corrupt.splat");
}
