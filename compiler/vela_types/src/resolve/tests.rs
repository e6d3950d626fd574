use pretty_assertions::assert_eq;
use rustc_hash::FxHashMap;
use vela_ast::SourceLocation;

use super::*;
use crate::data::ArraySize;

fn replacements(pairs: &[(&str, Type)]) -> FxHashMap<String, Type> {
    pairs
        .iter()
        .map(|(name, ty)| ((*name).to_owned(), *ty))
        .collect()
}

#[test]
fn resolve_without_placeholders_is_a_no_op() {
    let pool = TypePool::new();
    let ty = pool.array(
        pool.pointer(pool.int(), false, SourceLocation::DUMMY),
        ArraySize::Fixed(2),
        true,
        SourceLocation::DUMMY,
    );

    let resolved = pool.resolve(ty, &replacements(&[("T", pool.bool())]));
    assert_eq!(resolved, ty);
}

#[test]
fn resolve_substitutes_placeholder_names() {
    let pool = TypePool::new();
    let placeholder = pool.basic("T", Vec::new(), false, SourceLocation::DUMMY);

    let resolved = pool.resolve(placeholder, &replacements(&[("T", pool.int())]));
    assert_eq!(resolved, pool.int());
}

#[test]
fn resolve_preserves_occurrence_mutability_and_location() {
    let pool = TypePool::new();
    let location = SourceLocation::new(12, 5);
    let occurrence = pool.basic("T", Vec::new(), true, location);
    // The replacement is immutable and located elsewhere.
    let replacement = pool.basic("Res", Vec::new(), false, SourceLocation::new(1, 1));

    let resolved = pool.resolve(occurrence, &replacements(&[("T", replacement)]));
    assert!(resolved.is_mutable());
    assert_eq!(resolved.location(), location);
    assert_eq!(resolved.base(), replacement.base());
}

#[test]
fn resolve_recurses_into_composites() {
    let pool = TypePool::new();
    let placeholder = pool.basic("T", Vec::new(), false, SourceLocation::DUMMY);
    let f = pool.function(
        placeholder,
        vec![pool.pointer(placeholder, false, SourceLocation::DUMMY)],
        false,
        SourceLocation::DUMMY,
    );

    let resolved = pool.resolve(f, &replacements(&[("T", pool.bool())]));
    assert_eq!(pool.return_type(resolved), pool.bool());
    assert_eq!(
        pool.param_types(resolved),
        vec![pool.pointer(pool.bool(), false, SourceLocation::DUMMY)]
    );
}

#[test]
fn resolve_recurses_into_generic_args() {
    let pool = TypePool::new();
    let placeholder = pool.basic("T", Vec::new(), false, SourceLocation::DUMMY);
    let list = pool.basic("List", vec![placeholder], false, SourceLocation::DUMMY);

    let resolved = pool.resolve(list, &replacements(&[("T", pool.int())]));
    assert_eq!(pool.generic_args(resolved), vec![pool.int()]);
}

#[test]
fn set_mutable_propagates_into_arrays() {
    let pool = TypePool::new();
    let array = pool.array(pool.int(), ArraySize::Fixed(3), false, SourceLocation::DUMMY);

    let mutable = pool.set_mutable(array, true);
    assert!(mutable.is_mutable());
    assert!(pool.element_type(mutable).is_mutable());
}

#[test]
fn set_mutable_propagates_into_tuples() {
    let pool = TypePool::new();
    let tuple = pool.tuple(
        vec![
            TupleElement::new("a", pool.int()),
            TupleElement::new("b", pool.bool()),
        ],
        false,
        SourceLocation::DUMMY,
    );

    let mutable = pool.set_mutable(tuple, true);
    assert!(mutable.is_mutable());
    for element in pool.tuple_elements(mutable) {
        assert!(element.ty.is_mutable());
    }
}

#[test]
fn set_mutable_flips_only_the_outer_flag_elsewhere() {
    let pool = TypePool::new();
    let pointer = pool.pointer(pool.int(), false, SourceLocation::DUMMY);
    let optional = pool.optional(pool.bool(), false, SourceLocation::DUMMY);

    let mutable_pointer = pool.set_mutable(pointer, true);
    assert!(mutable_pointer.is_mutable());
    assert!(!pool.pointee(mutable_pointer).is_mutable());

    let mutable_optional = pool.set_mutable(optional, true);
    assert!(mutable_optional.is_mutable());
    assert!(!pool.wrapped_type(mutable_optional).is_mutable());

    let mutable_int = pool.set_mutable(pool.int(), true);
    assert!(mutable_int.is_mutable());
    assert_eq!(mutable_int.base(), pool.int().base());
}
