use super::*;
use crate::model::layout::Cell;
use serde_json::json;

#[test]
fn missing_fields_fail_precondition() {
    let defaults = StripStyle::default();

    let r = StripRequest::from_json(r#"{"layout": [[0]]}"#).unwrap();
    let err = r.check(&defaults).unwrap_err();
    assert!(matches!(err, StripError::Validation(ref m) if m == MISSING_FIELDS_MESSAGE));

    let r = StripRequest::from_json(r#"{"photos": ["a"]}"#).unwrap();
    assert!(r.check(&defaults).is_err());

    let r = StripRequest::from_json(r#"{"photos": [], "layout": [[0]]}"#).unwrap();
    assert!(matches!(
        r.check(&defaults).unwrap_err(),
        StripError::Validation(_)
    ));
}

#[test]
fn check_fills_optional_parts() {
    let defaults = StripStyle::default();
    let r = StripRequest::from_json(
        r#"{"photos": ["p0"], "layout": [[0, "text"]], "textElements": null, "cellText": ""}"#,
    )
    .unwrap();
    let c = r.check(&defaults).unwrap();
    assert_eq!(c.photos.len(), 1);
    assert_eq!(c.layout.rows()[0][1], Cell::Text("text".into()));
    assert!(c.text_elements.is_empty());
    assert!(c.cell_text.is_none());
    assert_eq!(c.style, &defaults);
}

#[test]
fn malformed_json_is_serde_error() {
    let err = StripRequest::from_json("{").unwrap_err();
    assert!(matches!(err, StripError::Serde(_)));
}

#[test]
fn success_response_wire_shape() {
    let r = StripResponse::success(
        "data:image/jpeg;base64,AAAA".to_string(),
        Canvas {
            width: 660,
            height: 1494,
        },
        vec![],
    );
    let v: serde_json::Value = serde_json::from_str(&r.to_json().unwrap()).unwrap();
    assert_eq!(
        v,
        json!({
            "success": true,
            "stripUrl": "data:image/jpeg;base64,AAAA",
            "dimensions": { "width": 660, "height": 1494 }
        })
    );
}

#[test]
fn failure_response_omits_details_unless_set() {
    let r = StripResponse::failure("empty layout", None);
    let v = serde_json::to_value(&r).unwrap();
    assert_eq!(v, json!({ "success": false, "error": "empty layout" }));
    assert!(!r.is_success());

    let r = StripResponse::failure("boom", Some("stage: encoding".to_string()));
    let v = serde_json::to_value(&r).unwrap();
    assert_eq!(v["details"], json!("stage: encoding"));
}

#[test]
fn unparseable_colours_fail_the_check_naming_the_field() {
    let defaults = StripStyle::default();
    let r = StripRequest::from_json(
        r#"{"photos": ["p0"], "layout": [[0]], "dimensions": {"backgroundColor": "nope"}}"#,
    )
    .unwrap();
    let err = r.check(&defaults).unwrap_err();
    assert!(
        matches!(err, StripError::Validation(ref m)
            if m.starts_with("dimensions.backgroundColor: invalid colour \"nope\"")),
        "{err}"
    );

    let r = StripRequest::from_json(
        r##"{"photos": ["p0"], "layout": [[0]],
            "textElements": [{"content": "a"}, {"content": "b", "shadow": {"color": "#12"}}]}"##,
    )
    .unwrap();
    let err = r.check(&defaults).unwrap_err();
    assert!(
        matches!(
            err,
            StripError::Validation(ref m) if m.starts_with("textElements[1].shadow.color:")
        ),
        "{err}"
    );
}
