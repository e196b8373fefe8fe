//! The CPU's variable table.
//!
//! A slot is either plain storage written by scripts, or a [`BoundVariable`]
//! whose reads and writes go through native callbacks installed by capability
//! providers. Only bound slots accept callbacks; a provider that names a plain
//! slot leaves it untouched.

use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

use crate::runner::cpu::Cpu;
use crate::runner::ds::error::KosResult;
use crate::runner::ds::value::Value;

/// Native read callback.
pub type BindingGetter = Rc<dyn Fn(&Cpu) -> Value>;

/// Native write callback.
pub type BindingSetter = Rc<dyn Fn(&Cpu, Value)>;

/// Native function callable from scripts by name.
pub type NativeFunction = Rc<dyn Fn(&Cpu, Vec<Value>) -> KosResult<Value>>;

pub type SharedVariableTable = Rc<RefCell<VariableTable>>;

/// A slot backed by native callbacks. Always carries at least one of them.
pub struct BoundVariable {
    getter: Option<BindingGetter>,
    setter: Option<BindingSetter>,
    /// Backing storage for whichever direction has no callback.
    value: Value,
}

impl BoundVariable {
    pub fn with_getter(getter: BindingGetter) -> Self {
        BoundVariable {
            getter: Some(getter),
            setter: None,
            value: Value::Null,
        }
    }

    pub fn with_setter(setter: BindingSetter) -> Self {
        BoundVariable {
            getter: None,
            setter: Some(setter),
            value: Value::Null,
        }
    }

    pub fn set_getter(&mut self, getter: BindingGetter) {
        self.getter = Some(getter);
    }

    pub fn set_setter(&mut self, setter: BindingSetter) {
        self.setter = Some(setter);
    }

    pub fn getter(&self) -> Option<BindingGetter> {
        self.getter.clone()
    }

    pub fn setter(&self) -> Option<BindingSetter> {
        self.setter.clone()
    }

    pub fn has_getter(&self) -> bool {
        self.getter.is_some()
    }

    pub fn has_setter(&self) -> bool {
        self.setter.is_some()
    }

    pub fn stored_value(&self) -> &Value {
        &self.value
    }

    pub fn set_stored_value(&mut self, value: Value) {
        self.value = value;
    }
}

impl fmt::Debug for BoundVariable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BoundVariable")
            .field("getter", &self.getter.is_some())
            .field("setter", &self.setter.is_some())
            .field("value", &self.value)
            .finish()
    }
}

#[derive(Debug)]
pub enum Variable {
    Plain(Value),
    Bound(BoundVariable),
}

impl Variable {
    pub fn is_bound(&self) -> bool {
        matches!(self, Variable::Bound(_))
    }

    pub fn as_bound(&self) -> Option<&BoundVariable> {
        match self {
            Variable::Bound(b) => Some(b),
            Variable::Plain(_) => None,
        }
    }

    pub fn as_bound_mut(&mut self) -> Option<&mut BoundVariable> {
        match self {
            Variable::Bound(b) => Some(b),
            Variable::Plain(_) => None,
        }
    }
}

/// Global namespace of one CPU: variables plus native functions.
///
/// Lookups here are exact. Callers decide on normalization: scripts reach the
/// table through [`Cpu`], which lower-cases names, while the binding manager
/// applies its own resolution rules.
#[derive(Default)]
pub struct VariableTable {
    variables: HashMap<String, Variable>,
    functions: HashMap<String, NativeFunction>,
}

impl VariableTable {
    pub fn new() -> Self {
        VariableTable::default()
    }

    pub fn into_shared(self) -> SharedVariableTable {
        Rc::new(RefCell::new(self))
    }

    pub fn find(&self, name: &str) -> Option<&Variable> {
        self.variables.get(name)
    }

    pub fn find_mut(&mut self, name: &str) -> Option<&mut Variable> {
        self.variables.get_mut(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.variables.contains_key(name)
    }

    /// Insert a bound slot, replacing whatever was stored under `name`.
    pub fn insert_bound(&mut self, name: impl Into<String>, variable: BoundVariable) {
        self.variables.insert(name.into(), Variable::Bound(variable));
    }

    /// Write a plain value. Returns `false` without writing when `name` is a
    /// bound slot.
    pub fn set_plain(&mut self, name: impl Into<String>, value: Value) -> bool {
        let name = name.into();
        match self.variables.get_mut(&name) {
            Some(Variable::Bound(_)) => false,
            Some(Variable::Plain(v)) => {
                *v = value;
                true
            }
            None => {
                self.variables.insert(name, Variable::Plain(value));
                true
            }
        }
    }

    pub fn remove(&mut self, name: &str) -> Option<Variable> {
        self.variables.remove(name)
    }

    /// Plain (script-owned) slots sorted by name.
    pub fn plain_variables(&self) -> Vec<(&str, &Value)> {
        let mut plain: Vec<(&str, &Value)> = self
            .variables
            .iter()
            .filter_map(|(name, v)| match v {
                Variable::Plain(value) => Some((name.as_str(), value)),
                Variable::Bound(_) => None,
            })
            .collect();
        plain.sort_by(|a, b| a.0.cmp(b.0));
        plain
    }

    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.variables.keys().map(|k| k.as_str()).collect();
        names.sort_unstable();
        names
    }

    pub fn len(&self) -> usize {
        self.variables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.variables.is_empty()
    }

    pub fn clear(&mut self) {
        self.variables.clear();
        self.functions.clear();
    }

    pub fn insert_function(&mut self, name: impl Into<String>, function: NativeFunction) {
        self.functions.insert(name.into(), function);
    }

    pub fn function(&self, name: &str) -> Option<NativeFunction> {
        self.functions.get(name).cloned()
    }

    pub fn has_function(&self, name: &str) -> bool {
        self.functions.contains_key(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_plain_refuses_bound_slot() {
        let mut table = VariableTable::new();
        table.insert_bound("altitude", BoundVariable::with_getter(Rc::new(|_: &Cpu| Value::Null)));
        assert!(!table.set_plain("altitude", Value::Number(1.0)));
        assert!(table.find("altitude").unwrap().is_bound());

        assert!(table.set_plain("x", Value::Number(1.0)));
        assert!(table.set_plain("x", Value::Number(2.0)));
        match table.find("x") {
            Some(Variable::Plain(v)) => assert_eq!(*v, Value::Number(2.0)),
            other => panic!("unexpected slot {:?}", other),
        }
    }

    #[test]
    fn test_plain_variables_skip_bound_and_sort() {
        let mut table = VariableTable::new();
        table.set_plain("b", Value::Boolean(true));
        table.set_plain("a", Value::Number(3.0));
        table.insert_bound("c", BoundVariable::with_setter(Rc::new(|_: &Cpu, _: Value| {})));
        let names: Vec<&str> = table.plain_variables().iter().map(|(n, _)| *n).collect();
        assert_eq!(names, vec!["a", "b"]);
        assert_eq!(table.names(), vec!["a", "b", "c"]);
    }

    #[test]
    fn test_lookup_is_exact() {
        let mut table = VariableTable::new();
        table.set_plain("Alt", Value::Null);
        assert!(table.contains("Alt"));
        assert!(!table.contains("alt"));
    }
}
