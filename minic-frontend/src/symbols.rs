//! Scoped symbol table
//!
//! A stack of scopes, each mapping a name to its symbol record. The
//! stack is never empty: scope 0 is the program's global scope, opened
//! when the table is created and never popped. Insertion and
//! `is_defined` work on the current scope only; `lookup` searches
//! innermost-first across all live scopes.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// Declared type of a symbol
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SymbolType {
    Int,
    Float,
    Void,
    Unknown,
}

impl fmt::Display for SymbolType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SymbolType::Int => write!(f, "int"),
            SymbolType::Float => write!(f, "float"),
            SymbolType::Void => write!(f, "void"),
            SymbolType::Unknown => write!(f, "unknown"),
        }
    }
}

/// Compile-time value of a symbol, when known
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum SymbolValue {
    Int(i64),
    Float(f64),
}

impl SymbolValue {
    fn matches_type(&self, ty: SymbolType) -> bool {
        matches!(
            (self, ty),
            (SymbolValue::Int(_), SymbolType::Int) | (SymbolValue::Float(_), SymbolType::Float)
        )
    }
}

impl fmt::Display for SymbolValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SymbolValue::Int(v) => write!(f, "{}", v),
            SymbolValue::Float(v) => write!(f, "{}", v),
        }
    }
}

/// One symbol binding
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SymbolInfo {
    pub name: String,
    pub ty: SymbolType,
    pub scope_level: u32,
    pub is_initialized: bool,
    pub value: Option<SymbolValue>,
}

impl SymbolInfo {
    fn new(name: &str, ty: SymbolType, scope_level: u32) -> Self {
        Self {
            name: name.to_string(),
            ty,
            scope_level,
            is_initialized: false,
            value: None,
        }
    }
}

/// Scope stack of symbol bindings
#[derive(Debug, Clone)]
pub struct SymbolTable {
    scopes: Vec<HashMap<String, SymbolInfo>>,
}

impl Default for SymbolTable {
    fn default() -> Self {
        Self::new()
    }
}

impl SymbolTable {
    /// Create a table with the global scope open
    pub fn new() -> Self {
        Self {
            scopes: vec![HashMap::new()],
        }
    }

    /// Current scope level; the global scope is level 0
    pub fn current_level(&self) -> u32 {
        (self.scopes.len() - 1) as u32
    }

    /// Push a fresh empty scope
    pub fn enter_scope(&mut self) {
        self.scopes.push(HashMap::new());
    }

    /// Pop the current scope; the global scope stays
    pub fn exit_scope(&mut self) {
        if self.scopes.len() > 1 {
            self.scopes.pop();
        }
    }

    /// Add a binding to the current scope; false if the name is
    /// already defined there
    pub fn insert(&mut self, name: &str, ty: SymbolType) -> bool {
        if self.is_defined(name) {
            return false;
        }

        let level = self.current_level();
        self.scopes
            .last_mut()
            .expect("scope stack is never empty")
            .insert(name.to_string(), SymbolInfo::new(name, ty, level));
        true
    }

    /// Mark the innermost binding of `name` initialized
    pub fn set_initialized(&mut self, name: &str) -> bool {
        match self.lookup_mut(name) {
            Some(info) => {
                info.is_initialized = true;
                true
            }
            None => false,
        }
    }

    /// Record a value on the innermost binding; the value's type must
    /// match the declared type
    pub fn set_value(&mut self, name: &str, value: SymbolValue) -> bool {
        let Some(info) = self.lookup_mut(name) else {
            return false;
        };
        if !value.matches_type(info.ty) {
            return false;
        }
        info.value = Some(value);
        info.is_initialized = true;
        true
    }

    /// Innermost-first search across all live scopes
    pub fn lookup(&self, name: &str) -> Option<&SymbolInfo> {
        self.scopes.iter().rev().find_map(|scope| scope.get(name))
    }

    fn lookup_mut(&mut self, name: &str) -> Option<&mut SymbolInfo> {
        self.scopes
            .iter_mut()
            .rev()
            .find_map(|scope| scope.get_mut(name))
    }

    /// True iff the name is bound in the current scope
    pub fn is_defined(&self, name: &str) -> bool {
        self.scopes
            .last()
            .map(|scope| scope.contains_key(name))
            .unwrap_or(false)
    }

    /// Number of bindings in the current scope
    pub fn current_scope_len(&self) -> usize {
        self.scopes.last().map(|scope| scope.len()).unwrap_or(0)
    }

    /// Snapshot of every live binding, outermost scope first
    pub fn all_symbols(&self) -> Vec<SymbolInfo> {
        let mut result = Vec::new();
        for scope in &self.scopes {
            let mut names: Vec<&String> = scope.keys().collect();
            names.sort();
            for name in names {
                result.push(scope[name].clone());
            }
        }
        result
    }

    /// Render every live scope for debugging output
    pub fn dump(&self) -> String {
        let mut out = String::from("Symbol table:\n");
        for (level, scope) in self.scopes.iter().enumerate() {
            out.push_str(&format!("  scope {}:\n", level));
            let mut names: Vec<&String> = scope.keys().collect();
            names.sort();
            for name in names {
                let info = &scope[name];
                out.push_str(&format!(
                    "    {} ({}) - {}",
                    info.name,
                    info.ty,
                    if info.is_initialized {
                        "initialized"
                    } else {
                        "uninitialized"
                    }
                ));
                if let Some(value) = &info.value {
                    out.push_str(&format!(" = {}", value));
                }
                out.push('\n');
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_and_lookup() {
        let mut table = SymbolTable::new();
        assert!(table.insert("x", SymbolType::Int));

        let info = table.lookup("x").expect("x must be bound");
        assert_eq!(info.name, "x");
        assert_eq!(info.ty, SymbolType::Int);
        assert_eq!(info.scope_level, 0);
        assert!(!info.is_initialized);
        assert_eq!(table.current_scope_len(), 1);
    }

    #[test]
    fn test_insert_fails_iff_defined_in_current_scope() {
        let mut table = SymbolTable::new();
        assert!(!table.is_defined("x"));
        assert!(table.insert("x", SymbolType::Int));
        assert!(table.is_defined("x"));
        assert!(!table.insert("x", SymbolType::Float));

        // Shadowing in an inner scope is allowed
        table.enter_scope();
        assert!(!table.is_defined("x"));
        assert!(table.insert("x", SymbolType::Float));
        assert_eq!(table.lookup("x").unwrap().ty, SymbolType::Float);
        assert_eq!(table.lookup("x").unwrap().scope_level, 1);
    }

    #[test]
    fn test_lookup_is_innermost_first() {
        let mut table = SymbolTable::new();
        table.insert("x", SymbolType::Int);
        table.enter_scope();
        table.insert("x", SymbolType::Float);

        assert_eq!(table.lookup("x").unwrap().scope_level, 1);
        table.exit_scope();
        assert_eq!(table.lookup("x").unwrap().scope_level, 0);
    }

    #[test]
    fn test_global_scope_is_never_popped() {
        let mut table = SymbolTable::new();
        table.insert("g", SymbolType::Int);
        table.exit_scope();
        table.exit_scope();

        assert_eq!(table.current_level(), 0);
        assert!(table.lookup("g").is_some());
    }

    #[test]
    fn test_balanced_enter_exit_returns_to_zero() {
        let mut table = SymbolTable::new();
        for _ in 0..5 {
            table.enter_scope();
        }
        assert_eq!(table.current_level(), 5);
        for _ in 0..5 {
            table.exit_scope();
        }
        assert_eq!(table.current_level(), 0);
    }

    #[test]
    fn test_exiting_scope_drops_bindings() {
        let mut table = SymbolTable::new();
        table.enter_scope();
        table.insert("local", SymbolType::Int);
        assert!(table.lookup("local").is_some());

        table.exit_scope();
        assert!(table.lookup("local").is_none());
    }

    #[test]
    fn test_set_initialized() {
        let mut table = SymbolTable::new();
        table.insert("x", SymbolType::Int);
        assert!(table.set_initialized("x"));
        assert!(table.lookup("x").unwrap().is_initialized);
        assert!(!table.set_initialized("missing"));
    }

    #[test]
    fn test_set_value_requires_matching_type() {
        let mut table = SymbolTable::new();
        table.insert("x", SymbolType::Int);
        table.insert("y", SymbolType::Float);

        assert!(table.set_value("x", SymbolValue::Int(5)));
        assert!(!table.set_value("x", SymbolValue::Float(1.5)));
        assert!(table.set_value("y", SymbolValue::Float(1.5)));
        assert!(!table.set_value("missing", SymbolValue::Int(0)));

        let x = table.lookup("x").unwrap();
        assert!(x.is_initialized);
        assert_eq!(x.value, Some(SymbolValue::Int(5)));
    }

    #[test]
    fn test_inserted_binding_carries_current_level() {
        let mut table = SymbolTable::new();
        table.enter_scope();
        table.enter_scope();
        table.insert("deep", SymbolType::Float);

        let info = table.lookup("deep").unwrap();
        assert_eq!(info.scope_level, table.current_level());
        assert_eq!(info.scope_level, 2);
    }

    #[test]
    fn test_all_symbols_snapshot() {
        let mut table = SymbolTable::new();
        table.insert("g", SymbolType::Int);
        table.enter_scope();
        table.insert("a", SymbolType::Float);
        table.insert("b", SymbolType::Int);

        let all = table.all_symbols();
        let names: Vec<&str> = all.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["g", "a", "b"]);

        table.exit_scope();
        assert_eq!(table.all_symbols().len(), 1);
    }

    #[test]
    fn test_dump_lists_scopes() {
        let mut table = SymbolTable::new();
        table.insert("x", SymbolType::Int);
        table.set_value("x", SymbolValue::Int(5));

        let dump = table.dump();
        assert!(dump.contains("scope 0:"));
        assert!(dump.contains("x (int) - initialized = 5"));
    }
}
