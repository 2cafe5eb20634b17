use lopdf::{Dictionary, Document, Object, Stream};
use pdf_rescale::*;

fn create_test_document(page_sizes: &[(i64, i64)]) -> Document {
    let mut doc = Document::with_version("1.7");

    // Create page tree root ID
    let pages_id = doc.new_object_id();

    // Create pages array
    let mut kids = Vec::new();
    for &(width, height) in page_sizes {
        let content_id = doc.add_object(Stream::new(Dictionary::new(), b"q Q".to_vec()));

        let page_id = doc.add_object(Dictionary::from_iter(vec![
            ("Type", Object::Name(b"Page".to_vec())),
            ("Parent", Object::Reference(pages_id)),
            (
                "MediaBox",
                Object::Array(vec![
                    Object::Integer(0),
                    Object::Integer(0),
                    Object::Integer(width),
                    Object::Integer(height),
                ]),
            ),
            ("Resources", Object::Dictionary(Dictionary::new())),
            ("Contents", Object::Reference(content_id)),
        ]));
        kids.push(Object::Reference(page_id));
    }

    // Create pages dict
    let pages_dict = Dictionary::from_iter(vec![
        ("Type", Object::Name(b"Pages".to_vec())),
        ("Kids", Object::Array(kids)),
        ("Count", Object::Integer(page_sizes.len() as i64)),
    ]);
    doc.objects.insert(pages_id, Object::Dictionary(pages_dict));

    // Create catalog
    let catalog_id = doc.add_object(Dictionary::from_iter(vec![
        ("Type", Object::Name(b"Catalog".to_vec())),
        ("Pages", Object::Reference(pages_id)),
    ]));

    doc.trailer.set("Root", catalog_id);

    doc
}

#[test]
fn test_stats_no_pages() {
    let doc = create_test_document(&[]);
    let result = calculate_statistics(&doc, &RescaleOptions::default());
    assert!(matches!(result, Err(RescaleError::NullOrMissingInput(_))));
}

#[test]
fn test_stats_mixed_document() {
    let doc = create_test_document(&[(612, 792), (792, 612), (200, 200), (1224, 1584)]);

    let stats = calculate_statistics(&doc, &RescaleOptions::default()).unwrap();

    assert_eq!(stats.source_pages, 4);
    // Only the double-size page is shrunk
    assert_eq!(stats.scaled_pages, 1);
    assert_eq!(stats.unscaled_pages, 3);
    assert_eq!(stats.rotated_pages, 1);
    assert_eq!(stats.overflowing_pages, 0);
}

#[test]
fn test_stats_scale_up_only_reports_overflow() {
    let doc = create_test_document(&[(1224, 1584), (306, 396)]);
    let mut options = RescaleOptions::default();
    options.scaling.mode = ScalingMode::ScaleUpOnly;

    let stats = calculate_statistics(&doc, &options).unwrap();

    assert_eq!(stats.scaled_pages, 1);
    assert_eq!(stats.unscaled_pages, 1);
    assert_eq!(stats.overflowing_pages, 1);
}

#[test]
fn test_stats_always_mode_counts_exact_fit_as_scaled() {
    let doc = create_test_document(&[(612, 792), (306, 396)]);
    let mut options = RescaleOptions::default();
    options.scaling.mode = ScalingMode::Always;

    let stats = calculate_statistics(&doc, &options).unwrap();

    assert_eq!(stats.scaled_pages, 2);
    assert_eq!(stats.unscaled_pages, 0);
}

#[test]
fn test_plan_pages_matches_scale_page() {
    let doc = create_test_document(&[(800, 600), (300, 300)]);
    let options = RescaleOptions::default();

    let plan = plan_pages(&doc, &options).unwrap();

    assert_eq!(plan.len(), 2);
    assert_eq!(
        plan[0],
        scale_page(Dimensions::new(800.0, 600.0), &options.target, &options.scaling).unwrap()
    );
    assert_eq!(plan[0].orientation, Orientation::Landscape);
    assert_eq!(plan[1].offset_x, 156.0);
    assert_eq!(plan[1].offset_y, 246.0);
}

#[test]
fn test_plan_pages_reports_failing_page() {
    let doc = create_test_document(&[(612, 792), (0, 792)]);

    let err = plan_pages(&doc, &RescaleOptions::default()).unwrap_err();

    assert!(matches!(err, RescaleError::RewriteAborted { index: 1, .. }));
    assert!(matches!(
        err.root_cause(),
        RescaleError::InvalidContent { .. }
    ));
}
