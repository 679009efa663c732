//! Converter registry
//!
//! Static mapping from file type to converter constructor. Every converter
//! is compiled in; lookup happens by the longest registered file-type suffix
//! of a path, so `water.esf.json` resolves to `esf.json` even if a plain
//! `json` converter is registered too.

use std::path::Path;

use crate::convert::Converter;

pub type ConverterFactory = fn() -> Box<dyn Converter>;

#[derive(Debug, Clone, Default)]
pub struct ConverterRegistry {
    factories: Vec<(String, ConverterFactory)>,
}

impl ConverterRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with the built-in shader converter for every
    /// [`SHADER_FILE_TYPES`](crate::convert::SHADER_FILE_TYPES) entry.
    #[cfg(feature = "naga")]
    #[must_use]
    pub fn with_defaults() -> Self {
        use crate::convert::{SHADER_FILE_TYPES, ShaderConverter};
        use crate::frontend::JsonTreeFrontend;
        use esf_compiler::NagaCompiler;

        fn shader_converter() -> Box<dyn Converter> {
            Box::new(ShaderConverter::new(JsonTreeFrontend, NagaCompiler::new()))
        }

        let mut registry = Self::new();
        for file_type in SHADER_FILE_TYPES {
            registry.register(file_type, shader_converter);
        }
        registry
    }

    /// Registers `factory` for `file_type`, replacing any previous entry.
    pub fn register(&mut self, file_type: &str, factory: ConverterFactory) {
        let file_type = file_type.to_ascii_lowercase();
        match self.factories.iter_mut().find(|(t, _)| *t == file_type) {
            Some(entry) => entry.1 = factory,
            None => self.factories.push((file_type, factory)),
        }
    }

    /// Registered file types, in registration order.
    pub fn file_types(&self) -> impl Iterator<Item = &str> {
        self.factories.iter().map(|(t, _)| t.as_str())
    }

    #[must_use]
    pub fn create(&self, file_type: &str) -> Option<Box<dyn Converter>> {
        self.factories
            .iter()
            .find(|(t, _)| t.eq_ignore_ascii_case(file_type))
            .map(|(_, factory)| factory())
    }

    /// Longest registered file type that `path`'s file name ends with.
    #[must_use]
    pub fn file_type_of(&self, path: &Path) -> Option<&str> {
        let name = path.file_name()?.to_str()?.to_ascii_lowercase();
        self.file_types()
            .filter(|t| {
                name.strip_suffix(t)
                    .is_some_and(|stem| stem.len() > 1 && stem.ends_with('.'))
            })
            .max_by_key(|t| t.len())
    }

    /// Converter for `path`, chosen by its file type.
    #[must_use]
    pub fn create_for_path(&self, path: &Path) -> Option<Box<dyn Converter>> {
        self.create(self.file_type_of(path)?)
    }
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use esf_core::Result;

    use super::*;
    use crate::convert::ConvertContext;

    struct NullConverter;

    impl Converter for NullConverter {
        fn supports_file_type(&self, file_type: &str) -> bool {
            file_type == "json"
        }

        fn convert(&self, _: &mut ConvertContext, _: &Path, _: &Path) -> Result<()> {
            Ok(())
        }
    }

    fn null_converter() -> Box<dyn Converter> {
        Box::new(NullConverter)
    }

    #[test]
    fn longest_suffix_wins() {
        let mut registry = ConverterRegistry::new();
        registry.register("json", null_converter);
        registry.register("ESF.json", null_converter);

        assert_eq!(registry.file_type_of(&PathBuf::from("a/water.esf.json")), Some("esf.json"));
        assert_eq!(registry.file_type_of(&PathBuf::from("config.json")), Some("json"));
        assert_eq!(registry.file_type_of(&PathBuf::from(".json")), None);
        assert_eq!(registry.file_type_of(&PathBuf::from("shader.hlsl")), None);
    }

    #[test]
    fn register_replaces_existing_entry() {
        let mut registry = ConverterRegistry::new();
        registry.register("json", null_converter);
        registry.register("JSON", null_converter);
        assert_eq!(registry.file_types().collect::<Vec<_>>(), ["json"]);
        assert!(registry.create("json").unwrap().supports_file_type("json"));
    }

    #[cfg(feature = "naga")]
    #[test]
    fn defaults_cover_shader_file_types() {
        let registry = ConverterRegistry::with_defaults();
        let converter = registry.create_for_path(Path::new("shaders/water.esf")).unwrap();
        assert!(converter.supports_file_type("esf.json"));
        assert!(registry.create_for_path(Path::new("water.esf.json")).is_some());
    }
}
