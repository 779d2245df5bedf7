//! Catalog-wide resolver properties against the built-in tables.

use std::collections::HashSet;

use vcs_atari2600::bankswitch::{self, SchemeCatalog, SchemeId};

#[test]
fn every_extension_resolves_to_its_indexed_scheme() {
    let catalog = SchemeCatalog::global();
    for (ext, id) in catalog.extensions() {
        let lower = format!("game.{}", ext);
        let upper = format!("GAME.{}", ext.to_ascii_uppercase());
        assert_eq!(bankswitch::resolve_by_extension(&lower), id, "{}", lower);
        assert_eq!(bankswitch::resolve_by_extension(&upper), id, "{}", upper);
        assert_eq!(bankswitch::recognized_extension(&lower), Some(ext));
    }
}

#[test]
fn every_token_resolves_to_its_scheme() {
    for descriptor in SchemeCatalog::global().descriptors() {
        assert_eq!(bankswitch::resolve_by_token(descriptor.token), descriptor.id);
    }
}

#[test]
fn canonical_tokens_are_unique() {
    let descriptors = SchemeCatalog::global().descriptors();
    let tokens: HashSet<_> = descriptors.iter().map(|d| d.token).collect();
    assert_eq!(tokens.len(), descriptors.len());
    assert_eq!(descriptors.len(), SchemeId::all().count());
}

#[test]
fn unknown_inputs_fall_back_to_auto() {
    assert_eq!(bankswitch::resolve_by_extension("game.xyz123"), SchemeId::Auto);
    assert_eq!(bankswitch::resolve_by_extension("no_extension"), SchemeId::Auto);
    assert_eq!(bankswitch::resolve_by_token("NOTASCHEME"), SchemeId::Auto);
}

#[test]
fn known_but_uninformative_extension_is_recognized() {
    assert!(bankswitch::is_recognized("game.bin"));
    assert_eq!(bankswitch::recognized_extension("game.bin"), Some("bin"));
    assert_eq!(bankswitch::resolve_by_extension("game.bin"), SchemeId::Auto);
    assert!(!bankswitch::is_recognized("game.xyz"));
}

#[test]
fn scenarios() {
    assert_eq!(bankswitch::resolve_by_extension("pitfall2.a26"), SchemeId::Auto);
    assert_eq!(bankswitch::resolve_by_extension("megaboy.f0"), SchemeId::F0);
    assert_eq!(bankswitch::resolve_by_token("DPC+"), SchemeId::DPCPlus);
    assert_eq!(bankswitch::resolve_by_token("dpc+"), SchemeId::Auto);
}
