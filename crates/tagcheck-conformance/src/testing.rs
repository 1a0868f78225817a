//! Scheme builders shared by the unit tests.

use tagcheck_core::{Field, GroupVersion, TypeDef, TypeName, TypeRef};
use tagcheck_scheme::Scheme;

pub(crate) const ORIGIN: &str = "github.com/openshift/origin/pkg";

pub(crate) fn tn(qualified: &str) -> TypeName {
    qualified.parse().expect("valid type name")
}

pub(crate) fn ptr(qualified: &str) -> String {
    format!("*{qualified}")
}

pub(crate) fn field(name: &str, ty: &str, tag: &str) -> Field {
    let ty: TypeRef = ty.parse().expect("valid type expression");
    Field::new(name, ty, tag)
}

pub(crate) fn record(pkg: &str, name: &str, fields: Vec<Field>) -> TypeDef {
    TypeDef::record(TypeName::new(pkg, name).expect("valid type name"), fields)
}

#[derive(Default)]
pub(crate) struct SchemeFixture {
    types: Vec<TypeDef>,
    known: Vec<(GroupVersion, Vec<TypeName>)>,
    priority: Vec<(String, Vec<String>)>,
}

impl SchemeFixture {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn with(mut self, def: TypeDef) -> Self {
        self.types.push(def);
        self
    }

    pub(crate) fn known(mut self, gv: GroupVersion, names: &[impl AsRef<str>]) -> Self {
        self.known.push((gv, names.iter().map(|n| tn(n.as_ref())).collect()));
        self
    }

    pub(crate) fn priority(mut self, group: &str, versions: &[&str]) -> Self {
        self.priority
            .push((group.to_string(), versions.iter().map(|v| v.to_string()).collect()));
        self
    }

    pub(crate) fn build(self) -> Scheme {
        let mut scheme = Scheme::new();
        scheme.add_types(self.types).expect("types install");
        for (gv, names) in self.known {
            scheme.add_known_types(&gv, names).expect("known types register");
        }
        for (group, versions) in self.priority {
            scheme
                .set_version_priority(&group, versions)
                .expect("priority set");
        }
        scheme
    }
}
