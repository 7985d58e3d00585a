use glam::*;
use splat_editor::{
    Error, HighlightStyle, MergeFlags, MergeOptions, MergedBuffer, ObjectId, SplatSet,
};

use crate::common::given;

#[test]
fn test_merged_buffer_build_should_assign_contiguous_ranges() {
    let mut objects = vec![given::object_a(), given::object_b()];

    let merged = MergedBuffer::build(&mut objects, &MergeOptions::new());

    assert_eq!(merged.len(), 5);
    assert_eq!(objects[0].range(), 0..3);
    assert_eq!(objects[1].range(), 3..5);
    assert_eq!(
        given::positions(&merged.splats()),
        [given::splats_a(), given::splats_b()]
            .iter()
            .flat_map(|splats| given::positions(splats))
            .collect::<Vec<_>>()
    );

    for pair in objects.windows(2) {
        assert_eq!(pair[0].end_index(), pair[1].start_index());
    }
}

#[test]
fn test_merged_buffer_build_after_removing_object_should_shift_ranges() {
    let mut objects = vec![given::object_a(), given::object_b()];
    MergedBuffer::build(&mut objects, &MergeOptions::new());

    objects.remove(0);
    let merged = MergedBuffer::build(&mut objects, &MergeOptions::new());

    assert_eq!(merged.len(), 2);
    assert_eq!(objects[0].range(), 0..2);
}

#[test]
fn test_merged_buffer_build_when_object_is_hidden_should_give_empty_range() {
    let mut objects = vec![given::object_a(), given::object_b()];
    objects[0].visible = false;

    let merged = MergedBuffer::build(&mut objects, &MergeOptions::new().visible_only(true));

    assert_eq!(merged.len(), 2);
    assert_eq!(objects[0].range(), 0..0);
    assert_eq!(objects[1].range(), 0..2);

    let merged = MergedBuffer::build(&mut objects, &MergeOptions::new().visible_only(false));

    assert_eq!(merged.len(), 5);
}

#[test]
fn test_merged_buffer_build_should_skip_erased_splats() {
    let mut objects = vec![given::object_a(), given::object_b()];
    let erased = [(ObjectId(0), 1), (ObjectId(1), 0)]
        .into_iter()
        .collect::<SplatSet>();

    let merged = MergedBuffer::build(&mut objects, &MergeOptions::new().erased(&erased));

    assert_eq!(merged.len(), 5 - erased.len());
    assert_eq!(objects[0].range(), 0..2);
    assert_eq!(objects[1].range(), 2..3);
    assert_eq!(
        given::positions(&merged.splats()),
        vec![Vec3::ZERO, vec3(2.0, 0.0, 0.0), vec3(11.0, 0.0, 0.0)]
    );
}

#[test]
fn test_merged_buffer_build_with_highlight_should_recolor_from_base_colors() {
    let mut objects = vec![given::object_a(), given::object_b()];
    let selected = [(ObjectId(1), 1)].into_iter().collect::<SplatSet>();
    let style = HighlightStyle {
        selected_rgb: U8Vec3::new(255, 255, 0),
        object_tint: U8Vec3::new(30, 60, 200),
    };
    let options = MergeOptions::new().highlight(&selected, Some(ObjectId(0)), style);

    let first = MergedBuffer::build(&mut objects, &options);
    let second = MergedBuffer::build(&mut objects, &options);

    assert_eq!(first, second);
    assert!(options.flags.contains(MergeFlags::HIGHLIGHT));

    let colors = first
        .splats()
        .iter()
        .map(|splat| splat.color)
        .collect::<Vec<_>>();
    assert_eq!(colors[0], U8Vec4::new(130, 160, 255, 255));
    assert_eq!(colors[3], U8Vec4::new(100, 100, 100, 255));
    assert_eq!(colors[4], U8Vec4::new(255, 255, 0, 255));

    assert_eq!(objects[0].splats()[0].color, U8Vec4::new(100, 100, 100, 255));
}

#[test]
fn test_merged_buffer_commit_object_should_only_repack_its_range() {
    let mut objects = vec![given::object_a(), given::object_b()];
    let mut merged = MergedBuffer::build(&mut objects, &MergeOptions::new());
    let before = merged.clone();

    objects[1].edit_splats(|splats| splats[0].pos = vec3(20.0, 1.0, 0.0));
    merged
        .commit_object(&objects[1], &MergeOptions::new())
        .expect("commit");

    assert_eq!(merged.as_bytes()[..3 * 32], before.as_bytes()[..3 * 32]);
    assert_eq!(merged.splat(3).expect("splat").pos, vec3(20.0, 1.0, 0.0));
    assert_eq!(merged.splat(4).expect("splat").pos, vec3(11.0, 0.0, 0.0));
}

#[test]
fn test_merged_buffer_commit_object_when_range_is_stale_should_return_error() {
    let mut objects = vec![given::object_a(), given::object_b()];
    let mut merged = MergedBuffer::build(&mut objects, &MergeOptions::new());
    let before = merged.clone();

    let erased = [(ObjectId(1), 0)].into_iter().collect::<SplatSet>();
    let result = merged.commit_object(&objects[1], &MergeOptions::new().erased(&erased));

    assert!(matches!(
        result,
        Err(Error::StaleObjectRange {
            id: ObjectId(1),
            start: 3,
            end: 5,
            expected: 1,
        })
    ));
    assert_eq!(merged, before);
}

#[test]
fn test_merged_buffer_bounds_should_cover_all_objects() {
    let mut objects = vec![given::object_a(), given::object_b()];

    let merged = MergedBuffer::build(&mut objects, &MergeOptions::new());
    let bounds = merged.bounds().expect("bounds");

    assert_eq!(bounds.min, Vec3::ZERO);
    assert_eq!(bounds.max, vec3(11.0, 0.0, 0.0));
}

#[test]
fn test_merged_buffer_build_when_no_objects_should_be_empty() {
    let merged = MergedBuffer::build(&mut [], &MergeOptions::default());

    assert!(merged.is_empty());
    assert_eq!(merged.bounds(), None);
}
