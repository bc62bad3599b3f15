use diesel_derive_enum::DbEnum;
use serde::{Deserialize, Serialize};

#[derive(
	Clone, Copy, DbEnum, Debug, Default, Deserialize, PartialEq, Eq, Serialize,
)]
#[ExistingTypePath = "crate::sql_types::ProfileKind"]
#[serde(rename_all = "lowercase")]
pub enum ProfileKind {
	#[default]
	User,
	Professional,
	Admin,
}

impl ProfileKind {
	#[must_use]
	pub fn get_variants() -> [&'static str; 3] { ["user", "professional", "admin"] }

	/// Whether profiles of this kind must carry a service category
	#[must_use]
	pub fn requires_category(self) -> bool { self == Self::Professional }
}
