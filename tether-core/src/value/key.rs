use std::borrow::Cow;
use std::fmt;

/// Address of a slot in a container.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Key {
    Index(usize),
    Name(String),
}

impl Key {
    /// The list index this key denotes, if it is a valid one.
    ///
    /// Names count when they spell a non-negative integer.
    pub fn as_index(&self) -> Option<usize> {
        match self {
            Key::Index(index) => Some(*index),
            Key::Name(name) => {
                if name.is_empty() || !name.bytes().all(|b| b.is_ascii_digit()) {
                    return None;
                }
                name.parse().ok()
            }
        }
    }

    /// The property name this key denotes on an object.
    pub fn as_name(&self) -> Cow<'_, str> {
        match self {
            Key::Index(index) => Cow::Owned(index.to_string()),
            Key::Name(name) => Cow::Borrowed(name),
        }
    }
}

impl From<usize> for Key {
    fn from(index: usize) -> Self {
        Key::Index(index)
    }
}

impl From<&str> for Key {
    fn from(name: &str) -> Self {
        Key::Name(name.to_owned())
    }
}

impl From<String> for Key {
    fn from(name: String) -> Self {
        Key::Name(name)
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Key::Index(index) => write!(f, "{index}"),
            Key::Name(name) => f.write_str(name),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn numeric_names_are_indices() {
        assert_eq!(Key::from("3").as_index(), Some(3));
        assert_eq!(Key::from(7_usize).as_index(), Some(7));
        assert_eq!(Key::from("-1").as_index(), None);
        assert_eq!(Key::from("1.5").as_index(), None);
        assert_eq!(Key::from("name").as_index(), None);
        assert_eq!(Key::from("").as_index(), None);
    }

    #[test]
    fn indices_have_names() {
        assert_eq!(Key::from(4_usize).as_name(), "4");
        assert_eq!(Key::from("count").as_name(), "count");
    }
}
