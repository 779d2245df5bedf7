//! Bankswitch scheme catalog and resolver
//!
//! Cartridges bigger than the 6507's 4K cartridge window expose their ROM
//! through one of many bank-switching conventions. Each convention has a
//! canonical token ("F8", "DPC+", ...) and one or more file extensions that
//! harmony/uno-cart style loaders use to carry the scheme in the filename.
//!
//! Two lookups are provided:
//! - by file extension (case-insensitive), used when inferring from a path
//! - by canonical token (exact case), used when a caller names a scheme
//!
//! A miss on either lookup is not an error: it yields [`SchemeId::Auto`],
//! which tells the engine to fall back to content detection.

use std::collections::HashMap;
use std::fmt;
use std::sync::OnceLock;

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;
use vcs_core::logging::{log, LogCategory, LogLevel};

/// Bank-switching scheme identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(u8)]
pub enum SchemeId {
    /// Undetermined; the engine must inspect the image
    Auto,
    /// 8K ECONObank
    Bs0840,
    Multi2In1,
    Multi4In1,
    Multi8In1,
    Multi16In1,
    Multi32In1,
    Multi64In1,
    Multi128In1,
    /// 64-2048 byte ROM, no banking
    Rom2K,
    /// 32K Tigervision
    Bs3E,
    /// 3E+ (TJ modified DASH)
    Bs3EPlus,
    /// 512K Tigervision
    Bs3F,
    Bs4A50,
    /// 4K ROM, no banking
    Rom4K,
    Bs4KSC,
    /// Supercharger
    AR,
    BF,
    BFSC,
    BUS,
    CDF,
    /// SpectraVideo CompuMate
    CM,
    CTY,
    CV,
    CVPlus,
    DASH,
    DF,
    DFSC,
    /// Pitfall II
    DPC,
    DPCPlus,
    E0,
    E7,
    E78K,
    EF,
    EFSC,
    /// Dynacom Megaboy
    F0,
    F4,
    F4SC,
    F6,
    F6SC,
    F8,
    F8SC,
    FA,
    FA2,
    FE,
    MDM,
    SB,
    UA,
    WD,
    X07,
    #[cfg(feature = "custom-arm")]
    Custom,
}

/// Static description of one scheme
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SchemeDescriptor {
    pub id: SchemeId,
    pub token: &'static str,
    pub description: &'static str,
}

const fn scheme(id: SchemeId, token: &'static str, description: &'static str) -> SchemeDescriptor {
    SchemeDescriptor {
        id,
        token,
        description,
    }
}

/// Every scheme, in `SchemeId` declaration order.
pub static DESCRIPTORS: &[SchemeDescriptor] = &[
    scheme(SchemeId::Auto, "AUTO", "Auto-detect"),
    scheme(SchemeId::Bs0840, "0840", "0840 (8K ECONObank)"),
    scheme(SchemeId::Multi2In1, "2IN1", "2IN1 Multicart (4-32K)"),
    scheme(SchemeId::Multi4In1, "4IN1", "4IN1 Multicart (8-32K)"),
    scheme(SchemeId::Multi8In1, "8IN1", "8IN1 Multicart (16-64K)"),
    scheme(SchemeId::Multi16In1, "16IN1", "16IN1 Multicart (32-128K)"),
    scheme(SchemeId::Multi32In1, "32IN1", "32IN1 Multicart (64/128K)"),
    scheme(SchemeId::Multi64In1, "64IN1", "64IN1 Multicart (128/256K)"),
    scheme(SchemeId::Multi128In1, "128IN1", "128IN1 Multicart (256/512K)"),
    scheme(SchemeId::Rom2K, "2K", "2K (64-2048 bytes Atari)"),
    scheme(SchemeId::Bs3E, "3E", "3E (32K Tigervision)"),
    scheme(SchemeId::Bs3EPlus, "3E+", "3E+ (TJ modified DASH)"),
    scheme(SchemeId::Bs3F, "3F", "3F (512K Tigervision)"),
    scheme(SchemeId::Bs4A50, "4A50", "4A50 (64K 4A50 + ram)"),
    scheme(SchemeId::Rom4K, "4K", "4K (4K Atari)"),
    scheme(SchemeId::Bs4KSC, "4KSC", "4KSC (CPUWIZ 4K + ram)"),
    scheme(SchemeId::AR, "AR", "AR (Supercharger)"),
    scheme(SchemeId::BF, "BF", "BF (CPUWIZ 256K)"),
    scheme(SchemeId::BFSC, "BFSC", "BFSC (CPUWIZ 256K + ram)"),
    scheme(SchemeId::BUS, "BUS", "BUS (Experimental)"),
    scheme(SchemeId::CDF, "CDF", "CDF (Chris, Darrell, Fred)"),
    scheme(SchemeId::CM, "CM", "CM (SpectraVideo CompuMate)"),
    scheme(SchemeId::CTY, "CTY", "CTY (CDW - Chetiry)"),
    scheme(SchemeId::CV, "CV", "CV (Commavid extra ram)"),
    scheme(SchemeId::CVPlus, "CV+", "CV+ (Extended Commavid)"),
    scheme(SchemeId::DASH, "DASH", "DASH (Experimental)"),
    scheme(SchemeId::DF, "DF", "DF (CPUWIZ 128K)"),
    scheme(SchemeId::DFSC, "DFSC", "DFSC (CPUWIZ 128K + ram)"),
    scheme(SchemeId::DPC, "DPC", "DPC (Pitfall II)"),
    scheme(SchemeId::DPCPlus, "DPC+", "DPC+ (Enhanced DPC)"),
    scheme(SchemeId::E0, "E0", "E0 (8K Parker Bros)"),
    scheme(SchemeId::E7, "E7", "E7 (16K M-network)"),
    scheme(SchemeId::E78K, "E78K", "E78K (8K M-network)"),
    scheme(SchemeId::EF, "EF", "EF (64K H. Runner)"),
    scheme(SchemeId::EFSC, "EFSC", "EFSC (64K H. Runner + ram)"),
    scheme(SchemeId::F0, "F0", "F0 (Dynacom Megaboy)"),
    scheme(SchemeId::F4, "F4", "F4 (32K Atari)"),
    scheme(SchemeId::F4SC, "F4SC", "F4SC (32K Atari + ram)"),
    scheme(SchemeId::F6, "F6", "F6 (16K Atari)"),
    scheme(SchemeId::F6SC, "F6SC", "F6SC (16K Atari + ram)"),
    scheme(SchemeId::F8, "F8", "F8 (8K Atari)"),
    scheme(SchemeId::F8SC, "F8SC", "F8SC (8K Atari + ram)"),
    scheme(SchemeId::FA, "FA", "FA (CBS RAM Plus)"),
    scheme(SchemeId::FA2, "FA2", "FA2 (CBS RAM Plus 24/28K)"),
    scheme(SchemeId::FE, "FE", "FE (8K Decathlon)"),
    scheme(SchemeId::MDM, "MDM", "MDM (Menu Driven Megacart)"),
    scheme(SchemeId::SB, "SB", "SB (128-256K SUPERbank)"),
    scheme(SchemeId::UA, "UA", "UA (8K UA Ltd.)"),
    scheme(SchemeId::WD, "WD", "WD (Experimental)"),
    scheme(SchemeId::X07, "X07", "X07 (64K AtariAge)"),
    #[cfg(feature = "custom-arm")]
    scheme(SchemeId::Custom, "CUSTOM", "CUSTOM (ARM)"),
];

/// File extensions (lower case, no dot) and the scheme each one implies.
pub static EXTENSIONS: &[(&str, SchemeId)] = &[
    // Plain ROM extensions: no scheme information
    ("a26", SchemeId::Auto),
    ("bin", SchemeId::Auto),
    ("rom", SchemeId::Auto),
    // Short (8.3 friendly) and full spellings
    ("084", SchemeId::Bs0840),
    ("0840", SchemeId::Bs0840),
    ("2n1", SchemeId::Multi2In1),
    ("4n1", SchemeId::Multi4In1),
    ("8n1", SchemeId::Multi8In1),
    ("16n", SchemeId::Multi16In1),
    ("16n1", SchemeId::Multi16In1),
    ("32n", SchemeId::Multi32In1),
    ("32n1", SchemeId::Multi32In1),
    ("64n", SchemeId::Multi64In1),
    ("64n1", SchemeId::Multi64In1),
    ("128", SchemeId::Multi128In1),
    ("128n1", SchemeId::Multi128In1),
    ("2k", SchemeId::Rom2K),
    ("3e", SchemeId::Bs3E),
    ("3ep", SchemeId::Bs3EPlus),
    ("3e+", SchemeId::Bs3EPlus),
    ("3f", SchemeId::Bs3F),
    ("4a5", SchemeId::Bs4A50),
    ("4a50", SchemeId::Bs4A50),
    ("4k", SchemeId::Rom4K),
    ("4ks", SchemeId::Bs4KSC),
    ("4ksc", SchemeId::Bs4KSC),
    ("ar", SchemeId::AR),
    ("bf", SchemeId::BF),
    ("bfs", SchemeId::BFSC),
    ("bfsc", SchemeId::BFSC),
    ("bus", SchemeId::BUS),
    ("cdf", SchemeId::CDF),
    ("cm", SchemeId::CM),
    ("cty", SchemeId::CTY),
    ("cv", SchemeId::CV),
    ("cvp", SchemeId::CVPlus),
    ("das", SchemeId::DASH),
    ("dash", SchemeId::DASH),
    ("df", SchemeId::DF),
    ("dfs", SchemeId::DFSC),
    ("dfsc", SchemeId::DFSC),
    ("dpc", SchemeId::DPC),
    ("dpp", SchemeId::DPCPlus),
    ("dpcp", SchemeId::DPCPlus),
    ("e0", SchemeId::E0),
    ("e7", SchemeId::E7),
    ("e78", SchemeId::E78K),
    ("e78k", SchemeId::E78K),
    ("ef", SchemeId::EF),
    ("efs", SchemeId::EFSC),
    ("efsc", SchemeId::EFSC),
    ("f0", SchemeId::F0),
    ("f4", SchemeId::F4),
    ("f4s", SchemeId::F4SC),
    ("f4sc", SchemeId::F4SC),
    ("f6", SchemeId::F6),
    ("f6s", SchemeId::F6SC),
    ("f6sc", SchemeId::F6SC),
    ("f8", SchemeId::F8),
    ("f8s", SchemeId::F8SC),
    ("f8sc", SchemeId::F8SC),
    ("fa", SchemeId::FA),
    ("fa2", SchemeId::FA2),
    ("fe", SchemeId::FE),
    ("mdm", SchemeId::MDM),
    ("sb", SchemeId::SB),
    ("ua", SchemeId::UA),
    ("wd", SchemeId::WD),
    ("x07", SchemeId::X07),
];

impl SchemeId {
    pub fn descriptor(self) -> &'static SchemeDescriptor {
        &DESCRIPTORS[self as usize]
    }

    /// Canonical token, e.g. "DPC+"
    pub fn token(self) -> &'static str {
        self.descriptor().token
    }

    /// Human-readable name, e.g. "DPC+ (Enhanced DPC)"
    pub fn description(self) -> &'static str {
        self.descriptor().description
    }

    /// All schemes in catalog order.
    pub fn all() -> impl Iterator<Item = SchemeId> {
        DESCRIPTORS.iter().map(|d| d.id)
    }

    pub fn is_auto(self) -> bool {
        self == SchemeId::Auto
    }
}

impl fmt::Display for SchemeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.token())
    }
}

impl Serialize for SchemeId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.token())
    }
}

impl<'de> Deserialize<'de> for SchemeId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let token = String::deserialize(deserializer)?;
        SchemeCatalog::global()
            .lookup_token(&token)
            .ok_or_else(|| serde::de::Error::custom(format!("unknown bankswitch scheme `{token}`")))
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CatalogError {
    #[error("Scheme {0:?} is described more than once")]
    DuplicateId(SchemeId),
    #[error("Canonical token `{0}` is claimed by more than one scheme")]
    DuplicateToken(String),
    #[error("Extension `{extension}` is claimed by both {first:?} and {second:?}")]
    DuplicateExtension {
        extension: String,
        first: SchemeId,
        second: SchemeId,
    },
    #[error("Extension `{extension}` points at undescribed scheme {id:?}")]
    UndescribedScheme { extension: String, id: SchemeId },
}

/// Scheme descriptors plus the extension and name indices built from them.
#[derive(Debug)]
pub struct SchemeCatalog {
    descriptors: Vec<SchemeDescriptor>,
    by_extension: HashMap<String, SchemeId>,
    by_name: HashMap<&'static str, SchemeId>,
}

impl SchemeCatalog {
    /// Build both indices, rejecting any token claimed twice.
    pub fn build(
        descriptors: &[SchemeDescriptor],
        extensions: &[(&str, SchemeId)],
    ) -> Result<Self, CatalogError> {
        let mut by_name = HashMap::with_capacity(descriptors.len());
        let mut seen_ids = Vec::with_capacity(descriptors.len());

        for descriptor in descriptors {
            if seen_ids.contains(&descriptor.id) {
                return Err(CatalogError::DuplicateId(descriptor.id));
            }
            seen_ids.push(descriptor.id);

            if by_name.insert(descriptor.token, descriptor.id).is_some() {
                return Err(CatalogError::DuplicateToken(descriptor.token.to_string()));
            }
        }

        let mut by_extension = HashMap::with_capacity(extensions.len());
        for &(extension, id) in extensions {
            let key = extension.to_ascii_lowercase();
            if !seen_ids.contains(&id) {
                return Err(CatalogError::UndescribedScheme {
                    extension: key,
                    id,
                });
            }
            if let Some(first) = by_extension.insert(key.clone(), id) {
                return Err(CatalogError::DuplicateExtension {
                    extension: key,
                    first,
                    second: id,
                });
            }
        }

        Ok(Self {
            descriptors: descriptors.to_vec(),
            by_extension,
            by_name,
        })
    }

    /// The built-in catalog, constructed on first use.
    ///
    /// # Panics
    ///
    /// If the built-in tables claim a token twice. That is a corrupt build,
    /// not a runtime condition.
    pub fn global() -> &'static SchemeCatalog {
        static CATALOG: OnceLock<SchemeCatalog> = OnceLock::new();
        CATALOG.get_or_init(|| match SchemeCatalog::build(DESCRIPTORS, EXTENSIONS) {
            Ok(catalog) => {
                log(LogCategory::Bankswitch, LogLevel::Debug, || {
                    format!(
                        "Bankswitch catalog: {} schemes, {} extensions",
                        catalog.descriptors.len(),
                        catalog.by_extension.len()
                    )
                });
                catalog
            }
            Err(e) => panic!("built-in bankswitch catalog is corrupt: {e}"),
        })
    }

    pub fn descriptors(&self) -> &[SchemeDescriptor] {
        &self.descriptors
    }

    /// Extension tokens and their schemes, sorted by extension.
    pub fn extensions(&self) -> Vec<(&str, SchemeId)> {
        let mut entries: Vec<_> = self
            .by_extension
            .iter()
            .map(|(ext, id)| (ext.as_str(), *id))
            .collect();
        entries.sort_unstable();
        entries
    }

    fn lookup_extension(&self, extension: &str) -> Option<SchemeId> {
        self.by_extension
            .get(&extension.to_ascii_lowercase())
            .copied()
    }

    fn lookup_token(&self, token: &str) -> Option<SchemeId> {
        self.by_name.get(token).copied()
    }

    /// Scheme implied by the text after the last '.' of `name`.
    ///
    /// Unknown or missing extensions give [`SchemeId::Auto`]; so do the
    /// plain ROM extensions (a26, bin, rom).
    pub fn resolve_by_extension(&self, name: &str) -> SchemeId {
        let id = extension_of(name)
            .and_then(|ext| self.lookup_extension(ext))
            .unwrap_or(SchemeId::Auto);
        log(LogCategory::Bankswitch, LogLevel::Trace, || {
            format!("Bankswitch: `{}` by extension -> {}", name, id)
        });
        id
    }

    /// Scheme whose canonical token is exactly `token` (case-sensitive).
    pub fn resolve_by_token(&self, token: &str) -> SchemeId {
        self.lookup_token(token).unwrap_or(SchemeId::Auto)
    }

    /// The extension of `name` when it is one the catalog knows, even if
    /// it carries no scheme information.
    pub fn recognized_extension<'a>(&self, name: &'a str) -> Option<&'a str> {
        extension_of(name).filter(|ext| self.lookup_extension(ext).is_some())
    }

    pub fn is_recognized(&self, name: &str) -> bool {
        self.recognized_extension(name).is_some()
    }

    /// An explicit non-AUTO token wins; otherwise infer from the extension.
    pub fn resolve(&self, name: &str, explicit: Option<&str>) -> SchemeId {
        if let Some(token) = explicit {
            let id = self.resolve_by_token(token);
            if !id.is_auto() {
                return id;
            }
            if token != SchemeId::Auto.token() {
                log(LogCategory::Bankswitch, LogLevel::Warn, || {
                    format!("Bankswitch: unknown scheme `{}`, inferring from name", token)
                });
            }
        }
        self.resolve_by_extension(name)
    }
}

fn extension_of(name: &str) -> Option<&str> {
    name.rfind('.').map(|idx| &name[idx + 1..])
}

/// [`SchemeCatalog::resolve_by_extension`] on the built-in catalog.
pub fn resolve_by_extension(name: &str) -> SchemeId {
    SchemeCatalog::global().resolve_by_extension(name)
}

/// [`SchemeCatalog::resolve_by_token`] on the built-in catalog.
pub fn resolve_by_token(token: &str) -> SchemeId {
    SchemeCatalog::global().resolve_by_token(token)
}

/// [`SchemeCatalog::recognized_extension`] on the built-in catalog.
pub fn recognized_extension(name: &str) -> Option<&str> {
    SchemeCatalog::global().recognized_extension(name)
}

/// [`SchemeCatalog::is_recognized`] on the built-in catalog.
pub fn is_recognized(name: &str) -> bool {
    SchemeCatalog::global().is_recognized(name)
}

/// [`SchemeCatalog::resolve`] on the built-in catalog.
pub fn resolve(name: &str, explicit: Option<&str>) -> SchemeId {
    SchemeCatalog::global().resolve(name, explicit)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_descriptors_follow_declaration_order() {
        for (idx, descriptor) in DESCRIPTORS.iter().enumerate() {
            assert_eq!(descriptor.id as usize, idx, "{}", descriptor.token);
        }
    }

    #[test]
    fn test_catalog_size() {
        let expected = if cfg!(feature = "custom-arm") { 51 } else { 50 };
        assert_eq!(SchemeCatalog::global().descriptors().len(), expected);
    }

    #[test]
    fn test_every_extension_resolves_to_its_scheme() {
        for &(ext, id) in EXTENSIONS {
            assert_eq!(resolve_by_extension(&format!("game.{ext}")), id, "{ext}");
        }
    }

    #[test]
    fn test_every_token_resolves_to_its_scheme() {
        for descriptor in DESCRIPTORS {
            assert_eq!(resolve_by_token(descriptor.token), descriptor.id);
        }
    }

    #[test]
    fn test_unknown_lookups_give_auto() {
        assert_eq!(resolve_by_extension("game.xyz123"), SchemeId::Auto);
        assert_eq!(resolve_by_extension("no_extension"), SchemeId::Auto);
        assert_eq!(resolve_by_extension("trailing."), SchemeId::Auto);
        assert_eq!(resolve_by_token("NOTASCHEME"), SchemeId::Auto);
    }

    #[test]
    fn test_scenarios() {
        assert_eq!(resolve_by_extension("pitfall2.a26"), SchemeId::Auto);
        assert_eq!(resolve_by_extension("megaboy.f0"), SchemeId::F0);
        assert_eq!(resolve_by_token("DPC+"), SchemeId::DPCPlus);
        assert_eq!(resolve_by_token("dpc+"), SchemeId::Auto);
    }

    #[test]
    fn test_extension_lookup_ignores_case() {
        assert_eq!(resolve_by_extension("MEGABOY.F0"), SchemeId::F0);
        assert_eq!(resolve_by_extension("Combat.Bin"), SchemeId::Auto);
        assert_eq!(recognized_extension("Combat.Bin"), Some("Bin"));
    }

    #[test]
    fn test_last_dot_wins() {
        assert_eq!(resolve_by_extension("roms/v1.2/game.f6sc"), SchemeId::F6SC);
        assert_eq!(resolve_by_extension("game.f8.zip"), SchemeId::Auto);
    }

    #[test]
    fn test_recognized_extension() {
        assert_eq!(recognized_extension("game.bin"), Some("bin"));
        assert!(is_recognized("game.bin"));
        assert_eq!(resolve_by_extension("game.bin"), SchemeId::Auto);

        assert_eq!(recognized_extension("game.xyz"), None);
        assert!(!is_recognized("game.xyz"));
        assert!(!is_recognized("README"));
        assert_eq!(recognized_extension("space.3e+"), Some("3e+"));
    }

    #[test]
    fn test_only_plain_extensions_claim_auto() {
        let auto: Vec<_> = EXTENSIONS
            .iter()
            .filter(|(_, id)| id.is_auto())
            .map(|(ext, _)| *ext)
            .collect();
        assert_eq!(auto, vec!["a26", "bin", "rom"]);
    }

    #[test]
    fn test_explicit_token_wins_over_extension() {
        assert_eq!(resolve("game.f8", Some("F6")), SchemeId::F6);
        assert_eq!(resolve("game.f8", Some("AUTO")), SchemeId::F8);
        assert_eq!(resolve("game.f8", Some("bogus")), SchemeId::F8);
        assert_eq!(resolve("game.f8", None), SchemeId::F8);
    }

    #[test]
    fn test_descriptor_lookup() {
        assert_eq!(SchemeId::DPCPlus.token(), "DPC+");
        assert_eq!(SchemeId::F0.description(), "F0 (Dynacom Megaboy)");
        assert_eq!(SchemeId::Auto.to_string(), "AUTO");
        assert_eq!(SchemeId::all().count(), DESCRIPTORS.len());
    }

    #[test]
    fn test_serde_uses_tokens() {
        let json = serde_json::to_string(&SchemeId::Bs3EPlus).unwrap();
        assert_eq!(json, "\"3E+\"");
        let back: SchemeId = serde_json::from_str(&json).unwrap();
        assert_eq!(back, SchemeId::Bs3EPlus);
        assert!(serde_json::from_str::<SchemeId>("\"f8\"").is_err());
    }

    #[test]
    fn test_build_rejects_duplicate_extension() {
        let err = SchemeCatalog::build(DESCRIPTORS, &[("f8", SchemeId::F8), ("F8", SchemeId::F6)])
            .unwrap_err();
        assert_eq!(
            err,
            CatalogError::DuplicateExtension {
                extension: "f8".to_string(),
                first: SchemeId::F8,
                second: SchemeId::F6,
            }
        );
    }

    #[test]
    fn test_build_rejects_duplicate_token() {
        let descriptors = [
            scheme(SchemeId::F8, "F8", "F8 (8K Atari)"),
            scheme(SchemeId::F8SC, "F8", "F8SC (8K Atari + ram)"),
        ];
        assert_eq!(
            SchemeCatalog::build(&descriptors, &[]).unwrap_err(),
            CatalogError::DuplicateToken("F8".to_string())
        );
    }

    #[test]
    fn test_build_rejects_duplicate_id() {
        let descriptors = [
            scheme(SchemeId::F8, "F8", "F8 (8K Atari)"),
            scheme(SchemeId::F8, "F8X", "F8 again"),
        ];
        assert_eq!(
            SchemeCatalog::build(&descriptors, &[]).unwrap_err(),
            CatalogError::DuplicateId(SchemeId::F8)
        );
    }

    #[test]
    fn test_build_rejects_undescribed_scheme() {
        let descriptors = [scheme(SchemeId::Auto, "AUTO", "Auto-detect")];
        assert!(matches!(
            SchemeCatalog::build(&descriptors, &[("f8", SchemeId::F8)]),
            Err(CatalogError::UndescribedScheme { .. })
        ));
    }

    #[test]
    fn test_extensions_listing_is_sorted() {
        let listing = SchemeCatalog::global().extensions();
        assert_eq!(listing.len(), EXTENSIONS.len());
        assert!(listing.windows(2).all(|w| w[0].0 < w[1].0));
    }
}
