//! Language definitions and lookup.
//!
//! A [`LanguageRegistry`] maps language ids to their definitions: display
//! title, aliases, the grammars they depend on and, optionally, the parser an
//! external formatter uses for them.

use serde::Serialize;
use std::collections::{BTreeMap, HashSet};
use std::path::Path;

/// Parser configuration for the external formatter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FormatterParser {
    pub parser: String,
    pub plugins: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LanguageDefinition {
    pub title: String,
    pub id: String,
    pub aliases: Vec<String>,
    /// Grammars that must be loaded before this one.
    pub dependencies: Vec<String>,
    pub extensions: Vec<String>,
    pub formatter: Option<FormatterParser>,
    pub popular: bool,
}

impl LanguageDefinition {
    pub fn new(id: &str, title: &str) -> Self {
        LanguageDefinition {
            title: title.to_string(),
            id: id.to_string(),
            aliases: Vec::new(),
            dependencies: Vec::new(),
            extensions: Vec::new(),
            formatter: None,
            popular: false,
        }
    }

    pub fn aliases(mut self, aliases: &[&str]) -> Self {
        self.aliases = aliases.iter().map(|a| a.to_string()).collect();
        self
    }

    pub fn depends_on(mut self, dependencies: &[&str]) -> Self {
        self.dependencies = dependencies.iter().map(|d| d.to_string()).collect();
        self
    }

    pub fn extensions(mut self, extensions: &[&str]) -> Self {
        self.extensions = extensions.iter().map(|e| e.to_string()).collect();
        self
    }

    pub fn formatter(mut self, parser: &str, plugins: &[&str]) -> Self {
        self.formatter = Some(FormatterParser {
            parser: parser.to_string(),
            plugins: plugins.iter().map(|p| p.to_string()).collect(),
        });
        self
    }

    pub fn popular(mut self) -> Self {
        self.popular = true;
        self
    }

    /// Case-insensitive match against the id, the title or an alias.
    pub fn matches(&self, name: &str) -> bool {
        let name = name.trim();
        self.id.eq_ignore_ascii_case(name)
            || self.title.eq_ignore_ascii_case(name)
            || self.aliases.iter().any(|a| a.eq_ignore_ascii_case(name))
    }
}

/// Dependency closure of a language.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoadOrder {
    /// Ids to load, dependencies first, the requested language last.
    pub languages: Vec<String>,
    /// Dependencies that are not registered, with the language requiring them.
    pub missing: Vec<(String, String)>,
}

/// Registry of known languages.
pub struct LanguageRegistry {
    languages: BTreeMap<String, LanguageDefinition>,
}

impl LanguageRegistry {
    /// Create a new empty registry
    pub fn new() -> Self {
        LanguageRegistry {
            languages: BTreeMap::new(),
        }
    }

    /// Register a language, replacing any language with the same id.
    pub fn register(&mut self, language: LanguageDefinition) {
        self.languages.insert(language.id.clone(), language);
    }

    /// Look a language up by id, title or alias.
    pub fn get(&self, name: &str) -> Option<&LanguageDefinition> {
        let key = name.trim().to_ascii_lowercase();
        self.languages
            .get(&key)
            .or_else(|| self.languages.values().find(|l| l.matches(name)))
    }

    pub fn has(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// All languages, sorted by title.
    pub fn list(&self) -> Vec<&LanguageDefinition> {
        let mut all: Vec<_> = self.languages.values().collect();
        all.sort_by_key(|l| l.title.to_ascii_lowercase());
        all
    }

    pub fn popular(&self) -> Vec<&LanguageDefinition> {
        self.list().into_iter().filter(|l| l.popular).collect()
    }

    /// Resolve the dependency closure of `id`. Each language appears once and
    /// cycles are cut where they are found.
    pub fn resolve_load_order(&self, id: &str) -> LoadOrder {
        let mut order = LoadOrder::default();
        let mut visited = HashSet::new();
        if let Some(language) = self.get(id) {
            self.visit(language, &mut visited, &mut order);
        }
        order
    }

    fn visit(
        &self,
        language: &LanguageDefinition,
        visited: &mut HashSet<String>,
        order: &mut LoadOrder,
    ) {
        if !visited.insert(language.id.clone()) {
            return;
        }
        for dependency in &language.dependencies {
            match self.get(dependency) {
                Some(dep) => self.visit(dep, visited, order),
                None => order
                    .missing
                    .push((dependency.clone(), language.id.clone())),
            }
        }
        order.languages.push(language.id.clone());
    }

    /// Detect a language from a file name based on its extension.
    pub fn detect_from_filename(&self, filename: &str) -> Option<&LanguageDefinition> {
        let extension = Path::new(filename).extension()?.to_str()?.to_ascii_lowercase();
        self.languages
            .values()
            .find(|l| l.extensions.iter().any(|e| *e == extension))
    }

    /// Registry with the built-in languages.
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        for language in builtin_languages() {
            registry.register(language);
        }
        registry
    }
}

impl Default for LanguageRegistry {
    fn default() -> Self {
        Self::with_defaults()
    }
}

fn builtin_languages() -> Vec<LanguageDefinition> {
    vec![
        LanguageDefinition::new("plaintext", "Plain Text")
            .aliases(&["text", "txt", "plain"])
            .extensions(&["txt"]),
        LanguageDefinition::new("markup", "Markup")
            .aliases(&["html", "xml", "svg"])
            .extensions(&["html", "htm", "xml", "svg"])
            .formatter("html", &["html"])
            .popular(),
        LanguageDefinition::new("css", "CSS")
            .extensions(&["css"])
            .formatter("css", &["postcss"])
            .popular(),
        LanguageDefinition::new("scss", "Sass (SCSS)")
            .depends_on(&["css"])
            .extensions(&["scss"])
            .formatter("css", &["postcss"]),
        LanguageDefinition::new("clike", "C-like"),
        LanguageDefinition::new("javascript", "JavaScript")
            .aliases(&["js"])
            .depends_on(&["clike"])
            .extensions(&["js", "mjs", "cjs"])
            .formatter("babel", &["babel", "estree"])
            .popular(),
        LanguageDefinition::new("jsx", "React JSX")
            .depends_on(&["markup", "javascript"])
            .extensions(&["jsx"])
            .formatter("babel", &["babel", "estree"]),
        LanguageDefinition::new("typescript", "TypeScript")
            .aliases(&["ts"])
            .depends_on(&["javascript"])
            .extensions(&["ts", "mts"])
            .formatter("typescript", &["typescript", "estree"])
            .popular(),
        LanguageDefinition::new("tsx", "React TSX")
            .depends_on(&["jsx", "typescript"])
            .extensions(&["tsx"])
            .formatter("typescript", &["typescript", "estree"]),
        LanguageDefinition::new("angular", "Angular")
            .aliases(&["Typescript"])
            .depends_on(&["typescript", "scss", "json", "markup"])
            .formatter("angular", &[]),
        LanguageDefinition::new("vue", "Vue")
            .aliases(&["Typescript"])
            .depends_on(&["typescript", "scss", "json", "markup"])
            .extensions(&["vue"]),
        LanguageDefinition::new("json", "JSON")
            .aliases(&["webmanifest"])
            .extensions(&["json"])
            .formatter("json", &["estree"])
            .popular(),
        LanguageDefinition::new("yaml", "YAML")
            .aliases(&["yml"])
            .extensions(&["yaml", "yml"])
            .formatter("yaml", &["yaml"])
            .popular(),
        LanguageDefinition::new("markdown", "Markdown")
            .aliases(&["md"])
            .depends_on(&["markup"])
            .extensions(&["md", "markdown"])
            .formatter("markdown", &["markdown"]),
        LanguageDefinition::new("graphql", "GraphQL")
            .extensions(&["graphql", "gql"])
            .formatter("graphql", &["graphql"]),
        LanguageDefinition::new("java", "Java")
            .depends_on(&["clike"])
            .extensions(&["java"])
            .formatter("java", &["java"])
            .popular(),
        LanguageDefinition::new("c", "C")
            .depends_on(&["clike"])
            .extensions(&["c", "h"]),
        LanguageDefinition::new("cpp", "C++")
            .depends_on(&["c"])
            .extensions(&["cpp", "cc", "cxx", "hpp"]),
        LanguageDefinition::new("csharp", "C#")
            .aliases(&["cs", "dotnet"])
            .depends_on(&["clike"])
            .extensions(&["cs"])
            .popular(),
        LanguageDefinition::new("go", "Go")
            .depends_on(&["clike"])
            .extensions(&["go"]),
        LanguageDefinition::new("rust", "Rust")
            .aliases(&["rs"])
            .extensions(&["rs"])
            .popular(),
        LanguageDefinition::new("python", "Python")
            .aliases(&["py"])
            .extensions(&["py"])
            .popular(),
        LanguageDefinition::new("php", "PHP")
            .depends_on(&["markup-templating"])
            .extensions(&["php"])
            .popular(),
        LanguageDefinition::new("markup-templating", "Markup templating")
            .depends_on(&["markup"]),
        LanguageDefinition::new("ruby", "Ruby")
            .aliases(&["rb"])
            .depends_on(&["clike"])
            .extensions(&["rb"]),
        LanguageDefinition::new("sql", "SQL")
            .extensions(&["sql"])
            .popular(),
        LanguageDefinition::new("bash", "Bash")
            .aliases(&["sh", "shell"])
            .extensions(&["sh", "bash"]),
        LanguageDefinition::new("haskell", "Haskell")
            .aliases(&["hs"])
            .extensions(&["hs"]),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_by_id_title_and_alias() {
        let registry = LanguageRegistry::default();
        assert_eq!(registry.get("JavaScript").map(|l| l.id.as_str()), Some("javascript"));
        assert_eq!(registry.get("js").map(|l| l.id.as_str()), Some("javascript"));
        assert_eq!(registry.get("  Rust ").map(|l| l.id.as_str()), Some("rust"));
        assert!(registry.get("cobol").is_none());
    }

    #[test]
    fn test_load_order_puts_dependencies_first() {
        let registry = LanguageRegistry::default();
        let order = registry.resolve_load_order("tsx");
        assert_eq!(order.languages.last().map(String::as_str), Some("tsx"));
        let pos = |id: &str| order.languages.iter().position(|l| l == id).expect(id);
        assert!(pos("clike") < pos("javascript"));
        assert!(pos("javascript") < pos("typescript"));
        assert!(pos("markup") < pos("jsx"));
        let unique: HashSet<_> = order.languages.iter().collect();
        assert_eq!(unique.len(), order.languages.len());
        assert!(order.missing.is_empty());
    }

    #[test]
    fn test_missing_dependency_and_cycles() {
        let mut registry = LanguageRegistry::new();
        registry.register(LanguageDefinition::new("a", "A").depends_on(&["b", "ghost"]));
        registry.register(LanguageDefinition::new("b", "B").depends_on(&["a"]));
        let order = registry.resolve_load_order("a");
        assert_eq!(order.languages, vec!["b".to_string(), "a".to_string()]);
        assert_eq!(order.missing, vec![("ghost".to_string(), "a".to_string())]);
    }

    #[test]
    fn test_detect_from_filename() {
        let registry = LanguageRegistry::default();
        assert_eq!(
            registry.detect_from_filename("src/main.RS").map(|l| l.id.as_str()),
            Some("rust")
        );
        assert_eq!(
            registry.detect_from_filename("app.tsx").map(|l| l.id.as_str()),
            Some("tsx")
        );
        assert!(registry.detect_from_filename("Makefile").is_none());
    }

    #[test]
    fn test_list_is_sorted_by_title() {
        let registry = LanguageRegistry::default();
        let titles: Vec<_> = registry.list().iter().map(|l| l.title.to_ascii_lowercase()).collect();
        let mut sorted = titles.clone();
        sorted.sort();
        assert_eq!(titles, sorted);
        assert!(registry.popular().iter().all(|l| l.popular));
    }
}
