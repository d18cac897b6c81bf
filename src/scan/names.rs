//! Qualifying type names as written in source.
//!
//! A simple name is looked up, in order, among:
//!
//! 1. the enclosing types and their member and local types, innermost first
//! 2. the top-level types of the unit
//! 3. single-type imports
//! 4. the implicitly imported `java.lang` types
//! 5. the unit's package
//!
//! A dotted name whose first segment is found this way continues with `$`
//! segments (`Outer.Inner` becomes `p.Outer$Inner`). Otherwise the name is
//! taken as written, switching to `$` after the first capitalized segment
//! (`java.util.Map.Entry` becomes `java.util.Map$Entry`).

use indexmap::IndexMap;
use smol_str::SmolStr;

use super::diagnostics::DiagnosticCollector;
use super::unit::{UnitScan, ident_tokens};
use crate::base::{NameError, QualifiedName};
use crate::syntax::{SyntaxKind, SyntaxNode, TokenKind, TreeView};

/// `java.lang` types visible without an import.
const JAVA_LANG: &[&str] = &[
    "AbstractMethodError",
    "Appendable",
    "ArithmeticException",
    "ArrayIndexOutOfBoundsException",
    "ArrayStoreException",
    "AssertionError",
    "AutoCloseable",
    "Boolean",
    "Byte",
    "CharSequence",
    "Character",
    "Class",
    "ClassCastException",
    "ClassLoader",
    "ClassNotFoundException",
    "CloneNotSupportedException",
    "Cloneable",
    "Comparable",
    "Deprecated",
    "Double",
    "Enum",
    "Error",
    "Exception",
    "Float",
    "FunctionalInterface",
    "IllegalAccessException",
    "IllegalArgumentException",
    "IllegalStateException",
    "IndexOutOfBoundsException",
    "InstantiationException",
    "Integer",
    "InterruptedException",
    "Iterable",
    "Long",
    "Math",
    "NegativeArraySizeException",
    "NoSuchFieldException",
    "NoSuchMethodException",
    "NullPointerException",
    "Number",
    "NumberFormatException",
    "Object",
    "OutOfMemoryError",
    "Override",
    "Process",
    "Readable",
    "Record",
    "ReflectiveOperationException",
    "Runnable",
    "Runtime",
    "RuntimeException",
    "SafeVarargs",
    "SecurityException",
    "Short",
    "StackOverflowError",
    "StrictMath",
    "String",
    "StringBuffer",
    "StringBuilder",
    "StringIndexOutOfBoundsException",
    "SuppressWarnings",
    "System",
    "Thread",
    "ThreadLocal",
    "Throwable",
    "UnsupportedOperationException",
    "Void",
];

/// The package declaration and single-type imports of a unit.
#[derive(Clone, Debug, Default)]
pub(super) struct Imports {
    package: Option<SmolStr>,
    /// Simple name → imported type.
    single: IndexMap<SmolStr, QualifiedName>,
}

impl Imports {
    /// Read the header of a unit. Static and on-demand imports do not name a
    /// single type and are skipped.
    pub(super) fn from_tree(root: &SyntaxNode, diagnostics: &mut DiagnosticCollector) -> Self {
        let mut imports = Imports::default();
        for child in root.children() {
            match child.kind() {
                SyntaxKind::PackageDecl => {
                    if let Some(name) = child.child_of_kind(SyntaxKind::QualifiedName) {
                        let tokens = ident_tokens(name);
                        let segments: Vec<&str> = tokens.iter().map(|t| t.text.as_str()).collect();
                        imports.package = Some(segments.join(".").into());
                    }
                }
                SyntaxKind::ImportDecl => {
                    if child.has_child_token(TokenKind::Static) || child.has_child_token(TokenKind::Star) {
                        continue;
                    }
                    let Some(name) = child.child_of_kind(SyntaxKind::QualifiedName) else {
                        continue;
                    };
                    let tokens = ident_tokens(name);
                    let segments: Vec<&str> = tokens.iter().map(|t| t.text.as_str()).collect();
                    let Some(&simple) = segments.last() else {
                        continue;
                    };
                    match QualifiedName::parse(&binary_name(&segments)) {
                        Ok(qualified) => {
                            imports.single.insert(simple.into(), qualified);
                        }
                        Err(_) => diagnostics.malformed_name(child.line(), child.column(), &segments.join(".")),
                    }
                }
                _ => {}
            }
        }
        imports
    }

    pub(super) fn package(&self) -> Option<&str> {
        self.package.as_deref()
    }

    pub(super) fn single(&self, simple: &str) -> Option<&QualifiedName> {
        self.single.get(simple)
    }

    /// A capitalized simple name nothing else claims.
    fn fallback(&self, simple: &str) -> String {
        if JAVA_LANG.contains(&simple) {
            return format!("java.lang.{simple}");
        }
        match &self.package {
            Some(package) => format!("{package}.{simple}"),
            None => simple.to_string(),
        }
    }
}

/// Join written segments, switching to `$` after the first capitalized one.
pub(super) fn binary_name(segments: &[&str]) -> String {
    let mut out = String::new();
    let mut nested = false;
    for (i, segment) in segments.iter().enumerate() {
        if i > 0 {
            out.push(if nested { '$' } else { '.' });
        }
        out.push_str(segment);
        nested |= starts_uppercase(segment);
    }
    out
}

fn starts_uppercase(segment: &str) -> bool {
    segment.chars().next().is_some_and(char::is_uppercase)
}

impl UnitScan<'_, '_> {
    /// The fully-qualified name `segments` denote from inside `owner`.
    pub(super) fn qualify(&self, segments: &[&str], owner: Option<usize>) -> Result<QualifiedName, NameError> {
        let Some((first, rest)) = segments.split_first() else {
            return Err(NameError::Empty);
        };
        let head = match self.lookup_simple(first, owner) {
            Some(name) => Some(name.as_str().to_string()),
            None if starts_uppercase(first) => Some(self.imports.fallback(first)),
            None => None,
        };
        let text = match head {
            Some(head) => rest.iter().fold(head, |mut acc, segment| {
                acc.push('$');
                acc.push_str(segment);
                acc
            }),
            None => binary_name(segments),
        };
        QualifiedName::parse(&text)
    }

    fn lookup_simple(&self, simple: &str, owner: Option<usize>) -> Option<&QualifiedName> {
        let mut current = owner;
        while let Some(index) = current {
            let ty = &self.types[index];
            if ty.source_name.as_deref() == Some(simple) {
                return Some(&ty.name);
            }
            if let Some(member) = ty.members.get(simple) {
                return Some(member);
            }
            current = ty.parent;
        }
        self.top_level.get(simple).or_else(|| self.imports.single(simple))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::base::FileId;
    use crate::syntax::{ParseOptions, parse_source};

    #[test]
    fn test_binary_name_switches_after_type_segment() {
        assert_eq!(binary_name(&["java", "util", "Map", "Entry"]), "java.util.Map$Entry");
        assert_eq!(binary_name(&["foo", "bar", "Date"]), "foo.bar.Date");
        assert_eq!(binary_name(&["a", "b"]), "a.b");
    }

    #[test]
    fn test_imports_skip_static_and_on_demand() {
        let parse = parse_source(
            "package example.one;\n\
             import java.util.Date;\n\
             import java.util.Map.Entry;\n\
             import java.io.*;\n\
             import static java.lang.Math.max;\n\
             class A {}\n",
            &ParseOptions::default(),
        );
        let mut diagnostics = DiagnosticCollector::new(FileId::new(0));
        let imports = Imports::from_tree(&parse.root, &mut diagnostics);

        assert_eq!(imports.package(), Some("example.one"));
        assert_eq!(imports.single("Date").map(QualifiedName::as_str), Some("java.util.Date"));
        assert_eq!(imports.single("Entry").map(QualifiedName::as_str), Some("java.util.Map$Entry"));
        assert!(imports.single("max").is_none());
        assert!(diagnostics.diagnostics().is_empty());
    }

    #[test]
    fn test_fallback_prefers_java_lang() {
        let imports = Imports {
            package: Some("p".into()),
            single: IndexMap::new(),
        };

        assert_eq!(imports.fallback("String"), "java.lang.String");
        assert_eq!(imports.fallback("Widget"), "p.Widget");
    }
}
