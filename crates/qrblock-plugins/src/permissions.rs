use serde::{Deserialize, Serialize};

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Capability {
    #[serde(rename = "block/qrcode:addinstance")]
    AddInstance,
    #[serde(rename = "block/qrcode:myaddinstance")]
    MyAddInstance,
    /// Lets the holder see and use the download link.
    #[serde(rename = "block/qrcode:seebutton")]
    SeeButton,
}

impl Capability {
    pub const ALL: [Capability; 3] = [
        Capability::AddInstance,
        Capability::MyAddInstance,
        Capability::SeeButton,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Capability::AddInstance => "block/qrcode:addinstance",
            Capability::MyAddInstance => "block/qrcode:myaddinstance",
            Capability::SeeButton => "block/qrcode:seebutton",
        }
    }
}

/// Role archetypes of the host platform.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Archetype {
    Student,
    Teacher,
    EditingTeacher,
    Manager,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(default)]
pub struct PermissionSet {
    pub add_instance: bool,
    pub my_add_instance: bool,
    pub see_button: bool,
}

impl PermissionSet {
    pub fn for_archetype(archetype: Archetype) -> Self {
        match archetype {
            Archetype::Student => Self::default(),
            Archetype::Teacher => Self {
                see_button: true,
                ..Self::default()
            },
            Archetype::EditingTeacher => Self {
                add_instance: true,
                see_button: true,
                ..Self::default()
            },
            Archetype::Manager => Self {
                add_instance: true,
                my_add_instance: true,
                see_button: true,
            },
        }
    }

    pub fn allows(&self, capability: Capability) -> bool {
        match capability {
            Capability::AddInstance => self.add_instance,
            Capability::MyAddInstance => self.my_add_instance,
            Capability::SeeButton => self.see_button,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn students_cannot_see_the_button() {
        let students = PermissionSet::for_archetype(Archetype::Student);
        assert!(Capability::ALL.iter().all(|c| !students.allows(*c)));
    }

    #[test]
    fn teachers_see_the_button() {
        for archetype in [Archetype::Teacher, Archetype::EditingTeacher, Archetype::Manager] {
            assert!(PermissionSet::for_archetype(archetype).allows(Capability::SeeButton));
        }
        assert!(!PermissionSet::for_archetype(Archetype::Teacher).allows(Capability::AddInstance));
    }

    #[test]
    fn capability_serializes_to_host_name() {
        let json = serde_json::to_string(&Capability::SeeButton).unwrap();
        assert_eq!(json, format!("\"{}\"", Capability::SeeButton.name()));
    }
}
