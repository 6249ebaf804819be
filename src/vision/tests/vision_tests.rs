use super::*;

fn filled(value: f64) -> FeatureVector {
    FeatureVector::new(vec![value; ENCODING_LEN]).unwrap()
}

#[test]
fn test_short_vector_is_rejected() {
    let err = FeatureVector::new(vec![0.1; 12]).unwrap_err();
    assert_eq!(err, EncodingError::Incomplete { len: 12 });
}

#[test]
fn test_parse_skips_blank_entries() {
    let text = format!("{},,", vec!["0.25"; ENCODING_LEN].join(", "));
    let vector = FeatureVector::parse(&text).unwrap();
    assert_eq!(vector.as_slice().len(), ENCODING_LEN);
    assert_eq!(vector.as_slice()[0], 0.25);
}

#[test]
fn test_parse_rejects_garbage() {
    let err = FeatureVector::parse("0.1,abc,0.2").unwrap_err();
    assert_eq!(
        err,
        EncodingError::InvalidNumber {
            token: "abc".to_string()
        }
    );
}

#[test]
fn test_text_form_parses_back() {
    let vector = filled(-0.125);
    assert_eq!(FeatureVector::parse(&vector.to_text()).unwrap(), vector);
}

#[test]
fn test_euclidean_distances() {
    let probe = filled(0.0);
    let mut shifted = vec![0.0; ENCODING_LEN];
    shifted[0] = 3.0;
    shifted[1] = 4.0;
    let known = vec![probe.clone(), FeatureVector::new(shifted).unwrap()];

    let distances = euclidean_distances(&known, &probe).unwrap();
    assert_eq!(distances, vec![0.0, 5.0]);
}

#[test]
fn test_distance_length_mismatch_is_error() {
    let longer = FeatureVector::new(vec![0.0; ENCODING_LEN + 1]).unwrap();
    assert!(euclidean_distances(&[longer], &filled(0.0)).is_err());
}
