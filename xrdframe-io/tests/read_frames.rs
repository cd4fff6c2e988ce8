//! End-to-end reads of on-disk mapping files.

use std::io::Write;
use tempfile::NamedTempFile;
use xrdframe_core::FrameShape;
use xrdframe_io::{
    read_frame_stack, read_frame_times, read_variables, Error, FrameFileReader, ARRAY_DATA_VAR,
};
use xrdframe_netcdf::{ClassicBuilder, Values};

fn write_temp(bytes: &[u8]) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(bytes).unwrap();
    file.flush().unwrap();
    file
}

/// A 3-D stack file with the frame axis as a fixed dimension.
fn stack_file(samples: Vec<i32>, frames: usize, rows: usize, cols: usize) -> NamedTempFile {
    let mut builder = ClassicBuilder::classic();
    let f = builder.dimension("numArrays", frames);
    let y = builder.dimension("dim1", rows);
    let x = builder.dimension("dim0", cols);
    builder.variable(ARRAY_DATA_VAR, &[f, y, x], Values::Int(samples));
    write_temp(&builder.build().unwrap())
}

#[test]
fn test_3d_stack_preserves_shape_and_values() {
    let samples: Vec<i32> = (0..24).collect();
    let file = stack_file(samples, 2, 3, 4);

    let stack = read_frame_stack(file.path()).unwrap();
    assert_eq!(stack.shape(), FrameShape::new(2, 3, 4));
    let flat: Vec<u16> = stack.as_array().iter().copied().collect();
    let expected: Vec<u16> = (0..24).collect();
    assert_eq!(flat, expected);
}

#[test]
fn test_2d_image_promotes_to_single_frame() {
    let mut builder = ClassicBuilder::classic();
    let y = builder.dimension("dim1", 3);
    let x = builder.dimension("dim0", 4);
    let samples: Vec<i16> = (0..12).collect();
    builder.variable(ARRAY_DATA_VAR, &[y, x], Values::Short(samples.clone()));
    let file = write_temp(&builder.build().unwrap());

    let stack = read_frame_stack(file.path()).unwrap();
    assert_eq!(stack.shape(), FrameShape::new(1, 3, 4));

    let frame: Vec<u16> = stack.frame(0).unwrap().iter().copied().collect();
    let expected: Vec<u16> = (0..12).collect();
    assert_eq!(frame, expected);
}

#[test]
fn test_missing_array_data_variable() {
    let mut builder = ClassicBuilder::classic();
    let x = builder.dimension("dim0", 2);
    builder.variable("other_data", &[x], Values::Short(vec![1, 2]));
    let file = write_temp(&builder.build().unwrap());

    let err = read_frame_stack(file.path()).unwrap_err();
    match err {
        Error::MissingVariable(name) => assert_eq!(name, ARRAY_DATA_VAR),
        other => panic!("expected MissingVariable, got {other}"),
    }
}

#[test]
fn test_non_container_bytes_fail_as_format_error() {
    let file = write_temp(b"definitely not a netCDF container\x00\x01\x02");
    let err = read_frame_stack(file.path()).unwrap_err();
    assert!(matches!(err, Error::Format(_)), "got {err}");
}

#[test]
fn test_read_is_idempotent() {
    let file = stack_file((0..16).collect(), 4, 2, 2);

    let first = read_frame_stack(file.path()).unwrap();
    let second = read_frame_stack(file.path()).unwrap();
    assert_eq!(first, second);
}

#[test]
fn test_all_zero_512x512_single_image() {
    let mut builder = ClassicBuilder::classic();
    let y = builder.dimension("dim1", 512);
    let x = builder.dimension("dim0", 512);
    builder.variable(ARRAY_DATA_VAR, &[y, x], Values::Short(vec![0; 512 * 512]));
    let file = write_temp(&builder.build().unwrap());

    let stack = read_frame_stack(file.path()).unwrap();
    assert_eq!(stack.shape(), FrameShape::new(1, 512, 512));
    assert!(stack.as_array().iter().all(|&v| v == 0));
}

#[test]
fn test_out_of_range_sample_truncates() {
    let mut samples = vec![0_i32; 4 * 256 * 256];
    samples[3 * 256 * 256 + 17 * 256 + 5] = 70000;
    let file = stack_file(samples, 4, 256, 256);

    let stack = read_frame_stack(file.path()).unwrap();
    assert_eq!(stack.shape(), FrameShape::new(4, 256, 256));
    // 70000 mod 65536
    assert_eq!(stack.as_array()[[3, 17, 5]], 4464);
    assert_eq!(stack.as_array()[[0, 0, 0]], 0);
}

#[test]
fn test_record_stack_matches_fixed_stack() {
    let samples: Vec<i16> = (0..18).collect();

    let fixed = {
        let mut builder = ClassicBuilder::classic();
        let f = builder.dimension("numArrays", 2);
        let y = builder.dimension("dim1", 3);
        let x = builder.dimension("dim0", 3);
        builder.variable(ARRAY_DATA_VAR, &[f, y, x], Values::Short(samples.clone()));
        write_temp(&builder.build().unwrap())
    };
    let record = {
        let mut builder = ClassicBuilder::classic();
        let f = builder.record_dimension("numArrays");
        let y = builder.dimension("dim1", 3);
        let x = builder.dimension("dim0", 3);
        builder.variable(ARRAY_DATA_VAR, &[f, y, x], Values::Short(samples));
        write_temp(&builder.build().unwrap())
    };

    let from_fixed = read_frame_stack(fixed.path()).unwrap();
    let from_record = read_frame_stack(record.path()).unwrap();
    assert_eq!(from_fixed, from_record);
    assert_eq!(from_record.shape(), FrameShape::new(2, 3, 3));
}

#[test]
fn test_1d_array_data_is_invalid_rank() {
    let mut builder = ClassicBuilder::classic();
    let x = builder.dimension("dim0", 4);
    builder.variable(ARRAY_DATA_VAR, &[x], Values::Short(vec![0; 4]));
    let file = write_temp(&builder.build().unwrap());

    let err = read_frame_stack(file.path()).unwrap_err();
    assert!(matches!(
        err,
        Error::Core(xrdframe_core::Error::InvalidRank(1))
    ));
}

#[test]
fn test_frame_times() {
    use approx::assert_relative_eq;

    let mut builder = ClassicBuilder::classic();
    let f = builder.dimension("numArrays", 2);
    let y = builder.dimension("dim1", 1);
    let x = builder.dimension("dim0", 1);
    builder.variable(ARRAY_DATA_VAR, &[f, y, x], Values::Short(vec![1, 2]));
    builder.variable("Attr_FrameTime", &[f], Values::Float(vec![0.25, 0.25]));
    let file = write_temp(&builder.build().unwrap());

    let times = read_frame_times(file.path()).unwrap();
    assert_eq!(times.len(), 2);
    assert_relative_eq!(times[0], 0.25);

    let reader = FrameFileReader::open(file.path()).unwrap();
    let stack = reader.read_frame_stack().unwrap();
    assert_eq!(stack.frame_count(), 2);
}

#[test]
fn test_frame_times_missing() {
    let file = stack_file(vec![0; 4], 1, 2, 2);
    let err = read_frame_times(file.path()).unwrap_err();
    assert!(matches!(err, Error::MissingVariable(_)));
}

#[test]
fn test_read_variables_passthrough() {
    let mut builder = ClassicBuilder::classic();
    let x = builder.dimension("dim0", 2);
    builder.variable(ARRAY_DATA_VAR, &[x], Values::Int(vec![70000, -1]));
    builder.variable("uniqueId", &[x], Values::Int(vec![41, 42]));
    let file = write_temp(&builder.build().unwrap());

    let vars = read_variables(file.path()).unwrap();
    assert_eq!(vars.len(), 2);
    // No casting on the pass-through path.
    assert_eq!(vars[ARRAY_DATA_VAR], Values::Int(vec![70000, -1]));
    assert_eq!(vars["uniqueId"], Values::Int(vec![41, 42]));
}
