use super::*;
use serde_json::json;

#[test]
fn deserializes_mixed_cells() {
    let layout: Layout = serde_json::from_value(json!([[0, "text"], [2, null], [-1, 1.5, 3.0]]))
        .unwrap();
    assert_eq!(
        layout.rows(),
        &[
            vec![Cell::Photo(0), Cell::Text("text".to_string())],
            vec![Cell::Photo(2), Cell::Blank],
            vec![Cell::Blank, Cell::Blank, Cell::Photo(3)],
        ]
    );
}

#[test]
fn jagged_layout_reports_max_cols() {
    let layout: Layout = serde_json::from_value(json!([[0, 1], [2]])).unwrap();
    assert_eq!(layout.row_count(), 2);
    assert_eq!(layout.max_cols(), 2);
    assert_eq!(layout.cell_count(), 3);
    assert_eq!(layout.photo_cell_count(), 3);
}

#[test]
fn grid_numbers_row_major_and_clamps() {
    let g = Layout::grid(2, 3);
    assert_eq!(
        g.rows(),
        &[
            vec![Cell::Photo(0), Cell::Photo(1), Cell::Photo(2)],
            vec![Cell::Photo(3), Cell::Photo(4), Cell::Photo(5)],
        ]
    );

    let clamped = Layout::grid(0, 40);
    assert_eq!(clamped.row_count(), 1);
    assert_eq!(clamped.max_cols(), GRID_MAX_SIDE as usize);
}

#[test]
fn cells_iterates_row_major_with_coordinates() {
    let layout: Layout = serde_json::from_value(json!([[0], ["text", 1]])).unwrap();
    let coords: Vec<(usize, usize)> = layout.cells().map(|(r, c, _)| (r, c)).collect();
    assert_eq!(coords, vec![(0, 0), (1, 0), (1, 1)]);
    assert_eq!(layout.photo_cell_count(), 2);
}

#[test]
fn serializes_back_to_wire_shape() {
    let layout = Layout::new(vec![vec![Cell::Photo(0), Cell::Text("text".into()), Cell::Blank]]);
    assert_eq!(serde_json::to_value(&layout).unwrap(), json!([[0, "text", null]]));
}

#[test]
fn rejects_non_array_cells() {
    assert!(serde_json::from_value::<Layout>(json!([[{"a": 1}]])).is_err());
}
