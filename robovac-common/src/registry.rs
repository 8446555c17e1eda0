use crate::PropertyDescriptor;

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum RegistryError {
    #[error("{class}: key {key} is bound to both {first} and {second}")]
    DuplicateKey {
        class: &'static str,
        key: &'static str,
        first: &'static str,
        second: &'static str,
    },
    #[error("{class}: property name {name} is declared twice")]
    DuplicateName {
        class: &'static str,
        name: &'static str,
    },
}

/// The full set of properties a kind of device exposes.
///
/// Declared once as a `static` and shared by every controller of that kind.
#[derive(Debug)]
pub struct DeviceClass {
    name: &'static str,
    descriptors: &'static [PropertyDescriptor],
}

impl DeviceClass {
    pub const fn new(name: &'static str, descriptors: &'static [PropertyDescriptor]) -> Self {
        Self { name, descriptors }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn descriptors(&self) -> &'static [PropertyDescriptor] {
        self.descriptors
    }

    pub fn by_name(&self, name: &str) -> Option<&'static PropertyDescriptor> {
        self.descriptors.iter().find(|d| d.name == name)
    }

    pub fn by_key(&self, key: &str) -> Option<&'static PropertyDescriptor> {
        self.descriptors.iter().find(|d| d.key == key)
    }

    pub fn state_signals(&self) -> impl Iterator<Item = &'static PropertyDescriptor> {
        self.descriptors.iter().filter(|d| d.state_signal)
    }

    pub fn validate(&self) -> Result<(), RegistryError> {
        for (i, a) in self.descriptors.iter().enumerate() {
            for b in &self.descriptors[i + 1..] {
                if a.key == b.key {
                    return Err(RegistryError::DuplicateKey {
                        class: self.name,
                        key: a.key,
                        first: a.name,
                        second: b.name,
                    });
                }

                if a.name == b.name {
                    return Err(RegistryError::DuplicateName { class: self.name, name: a.name });
                }
            }
        }

        Ok(())
    }
}
