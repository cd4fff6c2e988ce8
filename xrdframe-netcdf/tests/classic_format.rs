//! Round-trip coverage for the classic container parser.

use xrdframe_netcdf::{ClassicBuilder, Container, Error, NcType, Values};

#[test]
fn test_fixed_variable_roundtrip() {
    let mut builder = ClassicBuilder::classic();
    let frame = builder.dimension("numArrays", 2);
    let y = builder.dimension("dim1", 3);
    let x = builder.dimension("dim0", 4);
    let samples: Vec<i16> = (0..24).collect();
    builder.variable("array_data", &[frame, y, x], Values::Short(samples.clone()));

    let bytes = builder.build().unwrap();
    let container = Container::parse(&bytes).unwrap();

    let var = container.variable("array_data").expect("variable missing");
    assert_eq!(var.nc_type, NcType::Short);
    assert!(!var.is_record);
    assert_eq!(container.variable_shape(var), vec![2, 3, 4]);
    assert_eq!(container.read_variable(var).unwrap(), Values::Short(samples));
}

#[test]
fn test_record_variable_roundtrip() {
    let mut builder = ClassicBuilder::classic();
    let frame = builder.record_dimension("numArrays");
    let y = builder.dimension("dim1", 2);
    let x = builder.dimension("dim0", 2);
    let samples: Vec<i32> = (0..12).map(|v| v * 100).collect();
    builder.variable("array_data", &[frame, y, x], Values::Int(samples.clone()));

    let bytes = builder.build().unwrap();
    let container = Container::parse(&bytes).unwrap();

    assert_eq!(container.num_records(), 3);
    let var = container.variable("array_data").unwrap();
    assert!(var.is_record);
    assert_eq!(container.variable_shape(var), vec![3, 2, 2]);
    assert_eq!(container.read_variable(var).unwrap(), Values::Int(samples));
}

#[test]
fn test_interleaved_record_variables() {
    // Two record variables force padded per-record slabs.
    let mut builder = ClassicBuilder::classic();
    let frame = builder.record_dimension("numArrays");
    let one = builder.dimension("one", 1);
    builder.variable("a", &[frame, one], Values::Short(vec![1, 2, 3]));
    builder.variable("b", &[frame, one], Values::Int(vec![10, 20, 30]));

    let bytes = builder.build().unwrap();
    let container = Container::parse(&bytes).unwrap();

    assert_eq!(container.num_records(), 3);
    let a = container.variable("a").unwrap();
    let b = container.variable("b").unwrap();
    assert_eq!(
        container.read_variable(a).unwrap(),
        Values::Short(vec![1, 2, 3])
    );
    assert_eq!(
        container.read_variable(b).unwrap(),
        Values::Int(vec![10, 20, 30])
    );
}

#[test]
fn test_offset64_roundtrip() {
    let mut builder = ClassicBuilder::offset64();
    let y = builder.dimension("dim1", 2);
    let x = builder.dimension("dim0", 2);
    builder.variable(
        "array_data",
        &[y, x],
        Values::Double(vec![0.5, 1.5, 2.5, 3.5]),
    );

    let bytes = builder.build().unwrap();
    let container = Container::parse(&bytes).unwrap();
    let var = container.variable("array_data").unwrap();
    assert_eq!(
        container.read_variable(var).unwrap(),
        Values::Double(vec![0.5, 1.5, 2.5, 3.5])
    );
}

#[test]
fn test_streaming_record_count_derived_from_file_length() {
    let mut builder = ClassicBuilder::classic();
    let frame = builder.record_dimension("numArrays");
    let x = builder.dimension("dim0", 2);
    builder.variable("array_data", &[frame, x], Values::Short(vec![7; 8]));

    let mut bytes = builder.build().unwrap();
    // Overwrite the record count with the streaming sentinel.
    bytes[4..8].copy_from_slice(&0xFFFF_FFFFu32.to_be_bytes());

    let container = Container::parse(&bytes).unwrap();
    assert_eq!(container.num_records(), 4);
    let var = container.variable("array_data").unwrap();
    assert_eq!(
        container.read_variable(var).unwrap(),
        Values::Short(vec![7; 8])
    );
}

#[test]
fn test_global_attributes_decode() {
    let mut builder = ClassicBuilder::classic();
    let x = builder.dimension("dim0", 1);
    builder.global_attribute("detector", Values::Char(b"pilatus".to_vec()));
    builder.global_attribute("wavelength", Values::Double(vec![0.9763]));
    builder.variable("array_data", &[x], Values::Short(vec![0]));

    let bytes = builder.build().unwrap();
    let container = Container::parse(&bytes).unwrap();

    let attrs = &container.header().attributes;
    assert_eq!(attrs.len(), 2);
    assert_eq!(attrs[0].name, "detector");
    assert_eq!(attrs[0].values.as_text().as_deref(), Some("pilatus"));
    assert_eq!(attrs[1].values, Values::Double(vec![0.9763]));
}

#[test]
fn test_truncated_data_section() {
    let mut builder = ClassicBuilder::classic();
    let y = builder.dimension("dim1", 16);
    let x = builder.dimension("dim0", 16);
    builder.variable("array_data", &[y, x], Values::Short(vec![1; 256]));

    let mut bytes = builder.build().unwrap();
    bytes.truncate(bytes.len() - 10);

    let container = Container::parse(&bytes).unwrap();
    let var = container.variable("array_data").unwrap();
    assert!(matches!(
        container.read_variable(var),
        Err(Error::Truncated { .. })
    ));
}

#[test]
fn test_read_all_is_uncast_passthrough() {
    let mut builder = ClassicBuilder::classic();
    let x = builder.dimension("dim0", 2);
    builder.variable("array_data", &[x], Values::Int(vec![70000, -1]));
    builder.variable("Attr_FrameTime", &[x], Values::Float(vec![0.1, 0.1]));

    let bytes = builder.build().unwrap();
    let container = Container::parse(&bytes).unwrap();
    let all = container.read_all().unwrap();

    assert_eq!(all.len(), 2);
    // Pass-through keeps the stored type and values; no u16 narrowing.
    assert_eq!(all["array_data"], Values::Int(vec![70000, -1]));
    assert_eq!(all["Attr_FrameTime"], Values::Float(vec![0.1, 0.1]));
}
