// ABOUTME: Lexically chained binding scopes mapping symbol names to objects

use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

use crate::error::Error;
use crate::symbol::Symbol;
use crate::value::Object;

/// One scope in the binding chain. Lookups in a scope never see siblings;
/// `resolve` walks the parent chain toward the root. The chain is acyclic by
/// construction: a child always has a strictly older parent.
pub struct Binding {
    name: String,
    parent: Option<Rc<Binding>>,
    map: RefCell<HashMap<String, Slot>>,
    frozen: Cell<bool>,
}

struct Slot {
    value: Object,
    constant: bool,
}

impl Binding {
    /// Creates a scope with no parent.
    pub fn root(name: &str) -> Rc<Binding> {
        Rc::new(Binding {
            name: name.to_string(),
            parent: None,
            map: RefCell::new(HashMap::new()),
            frozen: Cell::new(false),
        })
    }

    /// Creates a child scope of `parent`.
    pub fn child(parent: &Rc<Binding>, name: &str) -> Rc<Binding> {
        Rc::new(Binding {
            name: name.to_string(),
            parent: Some(parent.clone()),
            map: RefCell::new(HashMap::new()),
            frozen: Cell::new(false),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn parent(&self) -> Option<Rc<Binding>> {
        self.parent.clone()
    }

    pub fn len(&self) -> usize {
        self.map.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.borrow().is_empty()
    }

    /// Installs `sym` in this scope, shadowing any outer binding.
    pub fn bind(&self, sym: &Symbol, value: Object) -> Result<(), Error> {
        self.bind_slot(sym.name(), value, false)
    }

    /// Like [`Binding::bind`] but the slot refuses later `set!`.
    pub fn bind_const(&self, sym: &Symbol, value: Object) -> Result<(), Error> {
        self.bind_slot(sym.name(), value, true)
    }

    fn bind_slot(&self, name: &str, value: Object, constant: bool) -> Result<(), Error> {
        if self.frozen.get() {
            return Err(Error::FrozenBinding(self.to_string()));
        }
        self.map
            .borrow_mut()
            .insert(name.to_string(), Slot { value, constant });
        Ok(())
    }

    /// Looks `name` up in this scope only.
    pub fn lookup(&self, name: &str) -> Option<Object> {
        self.map.borrow().get(name).map(|slot| slot.value.clone())
    }

    /// Walks the chain from this scope toward the root and returns the first
    /// value found.
    pub fn resolve(self: &Rc<Self>, name: &str) -> Option<Object> {
        self.resolve_scope(name).map(|(value, _)| value)
    }

    /// Like [`Binding::resolve`] but also reports which scope held the value.
    pub fn resolve_scope(self: &Rc<Self>, name: &str) -> Option<(Object, Rc<Binding>)> {
        let mut cur = self.clone();
        loop {
            if let Some(value) = cur.lookup(name) {
                return Some((value, cur));
            }
            match cur.parent() {
                Some(p) => cur = p,
                None => return None,
            }
        }
    }

    /// Updates the nearest scope that binds `sym`. Fails with `NotBound` when
    /// no ancestor binds it, with `FrozenBinding` when that scope is frozen,
    /// and with `ConstantSymbol` when the slot was installed by `defconst`.
    pub fn set(self: &Rc<Self>, sym: &Symbol, value: Object) -> Result<(), Error> {
        let mut cur = self.clone();
        loop {
            let found = cur.map.borrow().get(sym.name()).map(|slot| slot.constant);
            match found {
                Some(true) => return Err(Error::ConstantSymbol(sym.name().to_string())),
                Some(false) => {
                    if cur.frozen.get() {
                        return Err(Error::FrozenBinding(cur.to_string()));
                    }
                    if let Some(slot) = cur.map.borrow_mut().get_mut(sym.name()) {
                        slot.value = value;
                    }
                    return Ok(());
                }
                None => match cur.parent() {
                    Some(p) => cur = p,
                    None => return Err(Error::not_bound(sym.name(), self.name())),
                },
            }
        }
    }

    /// The contents of this scope as an association list of `(sym . obj)`
    /// pairs, in unspecified order.
    pub fn bindings_alist(&self) -> Object {
        let pairs: Vec<Object> = self
            .map
            .borrow()
            .iter()
            .map(|(name, slot)| Object::cons(Object::Sym(Symbol::intern(name)), slot.value.clone()))
            .collect();
        Object::from_vec(pairs)
    }

    /// Marks the scope read-only; later `bind` calls fail.
    pub fn freeze(&self) {
        self.frozen.set(true);
    }

    pub fn is_frozen(&self) -> bool {
        self.frozen.get()
    }
}

impl fmt::Display for Binding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#<binding:{}/{}>", self.name, self.len())
    }
}

impl fmt::Debug for Binding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#<binding:{}/{}>", self.name, self.len())
    }
}
