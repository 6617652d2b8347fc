// ABOUTME: Interned symbols with package tags and the global value slot

use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::rc::Rc;

use crate::error::Error;
use crate::value::Object;

/// An interned symbol. Two symbols with the same name (and package) are the
/// same object, so equality is pointer identity and stays stable across
/// reads, parses, and evaluations.
///
/// Besides its name a symbol carries a global value slot, a flat second
/// namespace orthogonal to the lexical binding chain. `define` and `set!`
/// never touch it; only the `symbol-value` family does.
#[derive(Clone)]
pub struct Symbol(Rc<SymbolData>);

struct SymbolData {
    name: String,
    package: Option<String>,
    slot: RefCell<Option<Object>>,
    slot_frozen: Cell<bool>,
}

thread_local! {
    // Append-only: interning an existing name returns the existing symbol.
    static INTERNER: RefCell<HashMap<(Option<String>, String), Symbol>> =
        RefCell::new(HashMap::new());
}

impl Symbol {
    /// Interns `name` in the default (empty) package.
    pub fn intern(name: &str) -> Symbol {
        Self::intern_full(None, name)
    }

    /// Interns `name` under a package tag. The reader never produces these;
    /// they exist for embedding hosts.
    pub fn intern_in(package: &str, name: &str) -> Symbol {
        Self::intern_full(Some(package), name)
    }

    fn intern_full(package: Option<&str>, name: &str) -> Symbol {
        INTERNER.with(|table| {
            let key = (package.map(str::to_string), name.to_string());
            let mut table = table.borrow_mut();
            if let Some(sym) = table.get(&key) {
                return sym.clone();
            }
            let sym = Symbol(Rc::new(SymbolData {
                name: name.to_string(),
                package: package.map(str::to_string),
                slot: RefCell::new(None),
                slot_frozen: Cell::new(false),
            }));
            table.insert(key, sym.clone());
            sym
        })
    }

    pub fn name(&self) -> &str {
        &self.0.name
    }

    pub fn package(&self) -> Option<&str> {
        self.0.package.as_deref()
    }

    /// Keywords are symbols whose printed name starts with `:`.
    pub fn is_keyword(&self) -> bool {
        self.0.name.starts_with(':')
    }

    /// Reads the global value slot; `None` when nothing was ever stored.
    pub fn value(&self) -> Option<Object> {
        self.0.slot.borrow().clone()
    }

    pub fn set_value(&self, obj: Object) -> Result<(), Error> {
        if self.0.slot_frozen.get() {
            return Err(Error::FrozenSymbol(self.0.name.clone()));
        }
        *self.0.slot.borrow_mut() = Some(obj);
        Ok(())
    }

    pub fn freeze_value(&self) {
        self.0.slot_frozen.set(true);
    }

    pub fn value_frozen(&self) -> bool {
        self.0.slot_frozen.get()
    }
}

impl PartialEq for Symbol {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

impl Eq for Symbol {}

impl Hash for Symbol {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.0.package.hash(state);
        self.0.name.hash(state);
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0.name)
    }
}

impl fmt::Debug for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Symbol({})", self.0.name)
    }
}
