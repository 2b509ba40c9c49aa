use lazy_static::lazy_static;
use std::sync::{PoisonError, RwLock};
use string_cache::DefaultAtom as Atom;

lazy_static! {
    static ref TEXT_INTERNER: RwLock<Vec<Atom>> = RwLock::new(Vec::new());
}

/// Stable id of an interned string, valid for the life of the process.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TextId(usize);

/// Interns `s`, returning the same id for equal strings.
pub fn intern_text(s: &str) -> TextId {
    let atom = Atom::from(s);
    if let Some(idx) = read_interner().iter().position(|a| *a == atom) {
        return TextId(idx);
    }
    let mut v = TEXT_INTERNER.write().unwrap_or_else(PoisonError::into_inner);
    // another caller may have pushed it between the two locks
    match v.iter().position(|a| *a == atom) {
        Some(idx) => TextId(idx),
        None => {
            v.push(atom);
            TextId(v.len() - 1)
        }
    }
}

fn read_interner() -> std::sync::RwLockReadGuard<'static, Vec<Atom>> {
    TEXT_INTERNER.read().unwrap_or_else(PoisonError::into_inner)
}
