//! Integration tests for collection and map mapping.

use std::collections::{HashMap, HashSet, VecDeque};

use isomer_core::{
    Bean, FromValue, Handle, MapError, Mappable, Mapper, MappingContext, ToValue, Ty, Typed, Value,
};

#[derive(Default, Mappable)]
struct TagBo {
    name: String,
}

#[derive(Default, Mappable)]
struct TagDto {
    name: String,
}

#[derive(Default, Mappable)]
struct PostBo {
    tags: HashSet<Handle<TagBo>>,
    authors: Vec<String>,
    scores: Vec<Option<i32>>,
    revisions: VecDeque<i64>,
    by_slug: HashMap<String, Handle<TagBo>>,
    ratings: HashMap<String, Option<i32>>,
}

#[derive(Default, Mappable)]
struct PostDto {
    tags: HashSet<Handle<TagDto>>,
    authors: Vec<String>,
    scores: Vec<i32>,
    revisions: VecDeque<i64>,
    by_slug: HashMap<String, Handle<TagDto>>,
    ratings: HashMap<String, Option<i32>>,
}

#[derive(Default, Mappable)]
struct RawDto {
    authors: Value,
}

#[derive(Default, Mappable)]
struct ShelfBo {
    index: HashMap<String, String>,
    labels: Vec<String>,
    title: String,
}

#[derive(Default, Mappable)]
struct ShelfDto {
    index: Vec<String>,
    labels: String,
    title: String,
}

#[derive(Default, Mappable)]
struct LabelsDto {
    labels: String,
}

fn tag(name: &str) -> Handle<TagBo> {
    Handle::new(TagBo {
        name: name.to_string(),
    })
}

fn post() -> Handle<PostBo> {
    let rust = tag("rust");
    Handle::new(PostBo {
        tags: [rust.clone(), tag("mapping"), tag("graphs")].into_iter().collect(),
        authors: vec!["ann".to_string(), "bob".to_string(), "cy".to_string()],
        scores: vec![Some(3), None, Some(5)],
        revisions: VecDeque::from(vec![3, 1, 2]),
        by_slug: HashMap::from([("rust".to_string(), rust)]),
        ratings: HashMap::from([("ann".to_string(), Some(4)), ("bob".to_string(), None)]),
    })
}

fn names(tags: &HashSet<Handle<TagDto>>) -> Vec<String> {
    let mut names: Vec<_> = tags.iter().map(|t| t.borrow().name.clone()).collect();
    names.sort();
    names
}

#[test]
fn sets_keep_their_elements() {
    let dto: Handle<PostDto> = Mapper::new().map(&post()).unwrap();
    assert_eq!(names(&dto.borrow().tags), ["graphs", "mapping", "rust"]);
}

#[test]
fn sequences_keep_their_order() {
    let dto: Handle<PostDto> = Mapper::new().map(&post()).unwrap();
    assert_eq!(dto.borrow().authors, ["ann", "bob", "cy"]);
    assert_eq!(dto.borrow().revisions, [3, 1, 2]);
}

#[test]
fn null_elements_are_dropped() {
    let dto: Handle<PostDto> = Mapper::new().map(&post()).unwrap();
    assert_eq!(dto.borrow().scores, [3, 5]);
}

#[test]
fn map_entries_are_all_kept() {
    let dto: Handle<PostDto> = Mapper::new().map(&post()).unwrap();
    let dto = dto.borrow();
    assert_eq!(dto.ratings.len(), 2);
    assert_eq!(dto.ratings["ann"], Some(4));
    assert_eq!(dto.ratings["bob"], None);
}

#[test]
fn elements_share_identity_with_fields() {
    let dto: Handle<PostDto> = Mapper::new().map(&post()).unwrap();
    let dto = dto.borrow();
    let by_slug = &dto.by_slug["rust"];
    let in_set = dto
        .tags
        .iter()
        .find(|t| t.borrow().name == "rust")
        .unwrap();
    assert!(Handle::ptr_eq(by_slug, in_set));
}

#[test]
fn top_level_collection() {
    let tags = vec![tag("a"), tag("b")];
    let dtos: Vec<Handle<TagDto>> = Mapper::new().map(&tags).unwrap();
    let names: Vec<_> = dtos.iter().map(|t| t.borrow().name.clone()).collect();
    assert_eq!(names, ["a", "b"]);
}

#[test]
fn top_level_collection_to_element_type() {
    let mapper = Mapper::new();
    let mut ctx = MappingContext::new();
    let tags = vec![tag("a"), tag("b")];

    let mapped = mapper
        .map_value(
            tags.to_value(),
            &Ty::Bean(TagDto::bean_type()),
            &mut ctx,
        )
        .unwrap();
    let dtos = Vec::<Handle<TagDto>>::from_value(mapped).unwrap();
    assert_eq!(dtos.len(), 2);
    assert_eq!(ctx.len(), 2);
}

#[test]
fn collection_kind_follows_the_source() {
    let source: HashSet<String> = ["x".to_string(), "y".to_string()].into_iter().collect();
    let mapper = Mapper::new();

    let mapped = mapper
        .map_value(
            source.to_value(),
            &Vec::<String>::ty(),
            &mut MappingContext::new(),
        )
        .unwrap();
    assert!(matches!(&mapped, Value::Set(items) if items.len() == 2));

    // Declared as a sequence, produced as a set; still fits the field type.
    let mut list: Vec<String> = mapper.map(&source).unwrap();
    list.sort();
    assert_eq!(list, ["x", "y"]);
}

#[test]
fn top_level_map() {
    let source = HashMap::from([(1u8, tag("one")), (2u8, tag("two"))]);
    let mapped: HashMap<u8, Handle<TagDto>> = Mapper::new().map(&source).unwrap();
    assert_eq!(mapped[&2].borrow().name, "two");
}

#[test]
fn unparameterized_destination_is_fatal() {
    let err = Mapper::new().map::<Handle<RawDto>>(&post()).unwrap_err();
    assert!(matches!(err, MapError::UnparameterizedContainer { .. }));
    assert!(!err.is_strict_mode());
}

#[test]
fn incompatible_elements_are_reported() {
    let source = vec![1i32, 2, 3];
    let lenient: Vec<String> = Mapper::new().map(&source).unwrap();
    assert!(lenient.is_empty());

    let err = Mapper::new()
        .strict()
        .map::<Vec<String>>(&source)
        .unwrap_err();
    assert!(err.is_strict_mode());
}

fn shelf() -> Handle<ShelfBo> {
    Handle::new(ShelfBo {
        index: HashMap::from([("a".to_string(), "1".to_string())]),
        labels: vec!["new".to_string()],
        title: "Reading".to_string(),
    })
}

#[test]
fn container_shape_mismatch_is_skipped_when_lenient() {
    let dto: Handle<ShelfDto> = Mapper::new().map(&shelf()).unwrap();
    let dto = dto.borrow();
    assert!(dto.index.is_empty());
    assert_eq!(dto.labels, "");
    assert_eq!(dto.title, "Reading");
}

#[test]
fn container_shape_mismatch_is_reported_when_strict() {
    let err = Mapper::new()
        .strict()
        .map::<Handle<ShelfDto>>(&shelf())
        .unwrap_err();
    assert!(err.is_strict_mode(), "{err}");

    let err = Mapper::new()
        .strict()
        .map::<Handle<LabelsDto>>(&shelf())
        .unwrap_err();
    assert!(err.is_strict_mode(), "{err}");
}

#[test]
fn top_level_collection_to_value() {
    let mapped: Value = Mapper::new().map(&vec![Some(1i32), None, Some(2)]).unwrap();
    assert_eq!(mapped, Value::Seq(vec![Value::I32(1), Value::I32(2)]));
}
