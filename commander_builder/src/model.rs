use std::cell::{Ref, RefCell, RefMut};
use std::rc::Rc;

/// A shared handle to caller owned storage, written into by a parameter during parsing.
///
/// Clone the handle into a parameter binding, keep the original, and read it back once parsing completes.
/// Clones all refer to the same storage.
///
/// ### Example
/// ```
/// # use commander_builder as commander;
/// use commander::{Cli, Commander, Context, Target};
///
/// let name = Target::new(String::default());
/// let mut cli = Cli::new("program", "An example program.");
/// cli.flag("name", "who to greet").string(&name);
/// cli.run(|_| Ok(()));
///
/// cli.parse(&Context::background(), &["--name", "abc"]).unwrap();
/// assert_eq!(name.get(), "abc");
/// ```
pub struct Target<T>(Rc<RefCell<T>>);

impl<T> Target<T> {
    /// Create a target holding `value`.
    pub fn new(value: T) -> Self {
        Self(Rc::new(RefCell::new(value)))
    }

    /// Immutably borrow the stored value.
    ///
    /// Panics if the value is currently mutably borrowed.
    pub fn borrow(&self) -> Ref<'_, T> {
        self.0.borrow()
    }

    /// Mutably borrow the stored value.
    ///
    /// Panics if the value is currently borrowed.
    pub fn borrow_mut(&self) -> RefMut<'_, T> {
        self.0.borrow_mut()
    }

    /// Overwrite the stored value.
    pub fn set(&self, value: T) {
        *self.0.borrow_mut() = value;
    }

    /// Overwrite the stored value, returning the previous one.
    pub fn replace(&self, value: T) -> T {
        self.0.replace(value)
    }
}

impl<T: Clone> Target<T> {
    /// Get a copy of the stored value.
    pub fn get(&self) -> T {
        self.0.borrow().clone()
    }
}

impl<T> Clone for Target<T> {
    fn clone(&self) -> Self {
        Self(Rc::clone(&self.0))
    }
}

impl<T: Default> Default for Target<T> {
    fn default() -> Self {
        Self::new(T::default())
    }
}

impl<T: std::fmt::Debug> std::fmt::Debug for Target<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("Target").field(&*self.0.borrow()).finish()
    }
}

impl<T> From<T> for Target<T> {
    fn from(value: T) -> Self {
        Self::new(value)
    }
}
