//! # Tipos de Token e Tags de Componentes de Endereço
//!
//! Define o vocabulário fechado de **tipos** que o classificador de gazetteers pode
//! atribuir a um token, e as **tags públicas** dos componentes de endereço.
//!
//! ## Categorias de Tipos
//!
//! | Grupo     | Tipos                                                          |
//! |-----------|----------------------------------------------------------------|
//! | Prefixo   | `address_prefix` ("domiciliul la adresa", "locuiesc in", ...)  |
//! | Rótulos   | `postal_code_text`, `county_text`, `street_number_text`, ...   |
//! | Valores   | `postal_code`, `county`, `city`, `street`, `block`, ...        |
//!
//! Somente os 12 tipos "significativos" (valores + `street_type`) são publicados,
//! convertidos em [`ComponentTag`] (`POSTAL_ADDRESS_*`).
//!
//! ## Conjuntos de Tipos
//!
//! Um token pode ter vários tipos candidatos ao mesmo tempo (empates na caracterização).
//! Como o vocabulário é fechado e pequeno, [`TypeSet`] é um bitset `Copy` de 32 bits,
//! iterado sempre na ordem canônica de [`TypeTag::ALL`].

use std::fmt;

use serde::{Deserialize, Serialize};

/// Tipos que um token pode receber na caracterização.
///
/// A ordem das variantes é a ordem de prioridade dos testes de caracterização.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TypeTag {
    /// Frase introdutória ("adresa", "cu domiciliul in", ...).
    AddressPrefix,
    PostalCodeText,
    PostalCode,
    CountryText,
    Country,
    CountyText,
    County,
    CityText,
    City,
    /// "str", "strd", "strada": rótulo de rua e também tipo de rua.
    StreetText,
    StreetType,
    Street,
    StreetNumberText,
    StreetNumber,
    BlockText,
    Block,
    StaircaseText,
    Staircase,
    ApartmentText,
    Apartment,
    IntercomText,
    Intercom,
    FloorText,
    Floor,
}

impl TypeTag {
    /// Todos os tipos, na ordem canônica.
    pub const ALL: [TypeTag; 24] = [
        TypeTag::AddressPrefix,
        TypeTag::PostalCodeText,
        TypeTag::PostalCode,
        TypeTag::CountryText,
        TypeTag::Country,
        TypeTag::CountyText,
        TypeTag::County,
        TypeTag::CityText,
        TypeTag::City,
        TypeTag::StreetText,
        TypeTag::StreetType,
        TypeTag::Street,
        TypeTag::StreetNumberText,
        TypeTag::StreetNumber,
        TypeTag::BlockText,
        TypeTag::Block,
        TypeTag::StaircaseText,
        TypeTag::Staircase,
        TypeTag::ApartmentText,
        TypeTag::Apartment,
        TypeTag::IntercomText,
        TypeTag::Intercom,
        TypeTag::FloorText,
        TypeTag::Floor,
    ];

    /// Nome em snake_case (para logs e serialização)
    pub fn name(&self) -> &'static str {
        match self {
            TypeTag::AddressPrefix => "address_prefix",
            TypeTag::PostalCodeText => "postal_code_text",
            TypeTag::PostalCode => "postal_code",
            TypeTag::CountryText => "country_text",
            TypeTag::Country => "country",
            TypeTag::CountyText => "county_text",
            TypeTag::County => "county",
            TypeTag::CityText => "city_text",
            TypeTag::City => "city",
            TypeTag::StreetText => "street_text",
            TypeTag::StreetType => "street_type",
            TypeTag::Street => "street",
            TypeTag::StreetNumberText => "street_number_text",
            TypeTag::StreetNumber => "street_number",
            TypeTag::BlockText => "block_text",
            TypeTag::Block => "block",
            TypeTag::StaircaseText => "staircase_text",
            TypeTag::Staircase => "staircase",
            TypeTag::ApartmentText => "apartment_text",
            TypeTag::Apartment => "apartment",
            TypeTag::IntercomText => "intercom_text",
            TypeTag::Intercom => "intercom",
            TypeTag::FloorText => "floor_text",
            TypeTag::Floor => "floor",
        }
    }

    /// Tenta parsear a partir do nome (ex: "street_number" → Some(StreetNumber))
    pub fn from_str(s: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|t| t.name() == s)
    }

    /// Índice numérico do tipo (posição em [`TypeTag::ALL`]).
    pub fn index(&self) -> usize {
        *self as usize
    }

    /// Verdadeiro para os 12 tipos publicados externamente.
    pub fn is_meaningful(&self) -> bool {
        self.component().is_some()
    }

    /// Tag pública do componente, se o tipo for significativo.
    pub fn component(&self) -> Option<ComponentTag> {
        match self {
            TypeTag::PostalCode => Some(ComponentTag::PostalCode),
            TypeTag::Country => Some(ComponentTag::Country),
            TypeTag::County => Some(ComponentTag::County),
            TypeTag::City => Some(ComponentTag::City),
            TypeTag::StreetType => Some(ComponentTag::StreetType),
            TypeTag::Street => Some(ComponentTag::Street),
            TypeTag::StreetNumber => Some(ComponentTag::StreetNumber),
            TypeTag::Block => Some(ComponentTag::Block),
            TypeTag::Staircase => Some(ComponentTag::Staircase),
            TypeTag::Apartment => Some(ComponentTag::Apartment),
            TypeTag::Intercom => Some(ComponentTag::Intercom),
            TypeTag::Floor => Some(ComponentTag::Floor),
            _ => None,
        }
    }
}

impl fmt::Display for TypeTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Tags públicas dos componentes de um endereço detectado.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ComponentTag {
    #[serde(rename = "POSTAL_ADDRESS_POSTAL_CODE")]
    PostalCode,
    #[serde(rename = "POSTAL_ADDRESS_COUNTRY")]
    Country,
    #[serde(rename = "POSTAL_ADDRESS_COUNTY")]
    County,
    #[serde(rename = "POSTAL_ADDRESS_CITY")]
    City,
    #[serde(rename = "POSTAL_ADDRESS_STREET_TYPE")]
    StreetType,
    #[serde(rename = "POSTAL_ADDRESS_STREET")]
    Street,
    #[serde(rename = "POSTAL_ADDRESS_STREET_NUMBER")]
    StreetNumber,
    #[serde(rename = "POSTAL_ADDRESS_BLOCK")]
    Block,
    #[serde(rename = "POSTAL_ADDRESS_STAIRCASE")]
    Staircase,
    #[serde(rename = "POSTAL_ADDRESS_APARTMENT")]
    Apartment,
    #[serde(rename = "POSTAL_ADDRESS_INTERCOM")]
    Intercom,
    #[serde(rename = "POSTAL_ADDRESS_FLOOR")]
    Floor,
}

impl ComponentTag {
    /// Nome público da tag (o mesmo usado na serialização JSON)
    pub fn name(&self) -> &'static str {
        match self {
            ComponentTag::PostalCode => "POSTAL_ADDRESS_POSTAL_CODE",
            ComponentTag::Country => "POSTAL_ADDRESS_COUNTRY",
            ComponentTag::County => "POSTAL_ADDRESS_COUNTY",
            ComponentTag::City => "POSTAL_ADDRESS_CITY",
            ComponentTag::StreetType => "POSTAL_ADDRESS_STREET_TYPE",
            ComponentTag::Street => "POSTAL_ADDRESS_STREET",
            ComponentTag::StreetNumber => "POSTAL_ADDRESS_STREET_NUMBER",
            ComponentTag::Block => "POSTAL_ADDRESS_BLOCK",
            ComponentTag::Staircase => "POSTAL_ADDRESS_STAIRCASE",
            ComponentTag::Apartment => "POSTAL_ADDRESS_APARTMENT",
            ComponentTag::Intercom => "POSTAL_ADDRESS_INTERCOM",
            ComponentTag::Floor => "POSTAL_ADDRESS_FLOOR",
        }
    }
}

/// Conjunto de [`TypeTag`] representado como bitset.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(into = "Vec<TypeTag>", from = "Vec<TypeTag>")]
pub struct TypeSet(u32);

impl TypeSet {
    pub const EMPTY: TypeSet = TypeSet(0);

    pub fn single(tag: TypeTag) -> Self {
        TypeSet(1 << tag.index())
    }

    pub fn contains(&self, tag: TypeTag) -> bool {
        self.0 & (1 << tag.index()) != 0
    }

    pub fn insert(&mut self, tag: TypeTag) {
        self.0 |= 1 << tag.index();
    }

    pub fn remove(&mut self, tag: TypeTag) {
        self.0 &= !(1 << tag.index());
    }

    pub fn without(self, tag: TypeTag) -> Self {
        TypeSet(self.0 & !(1 << tag.index()))
    }

    pub fn intersection(self, other: TypeSet) -> TypeSet {
        TypeSet(self.0 & other.0)
    }

    pub fn union(self, other: TypeSet) -> TypeSet {
        TypeSet(self.0 | other.0)
    }

    pub fn intersects(self, other: TypeSet) -> bool {
        self.0 & other.0 != 0
    }

    pub fn is_empty(&self) -> bool {
        self.0 == 0
    }

    pub fn len(&self) -> usize {
        self.0.count_ones() as usize
    }

    /// Itera os tipos na ordem canônica.
    pub fn iter(self) -> impl Iterator<Item = TypeTag> {
        TypeTag::ALL.into_iter().filter(move |t| self.contains(*t))
    }

    /// Apenas os tipos significativos (publicáveis).
    pub fn meaningful(self) -> TypeSet {
        self.iter().filter(|t| t.is_meaningful()).collect()
    }
}

impl FromIterator<TypeTag> for TypeSet {
    fn from_iter<I: IntoIterator<Item = TypeTag>>(iter: I) -> Self {
        let mut set = TypeSet::EMPTY;
        for tag in iter {
            set.insert(tag);
        }
        set
    }
}

impl From<Vec<TypeTag>> for TypeSet {
    fn from(tags: Vec<TypeTag>) -> Self {
        tags.into_iter().collect()
    }
}

impl From<TypeSet> for Vec<TypeTag> {
    fn from(set: TypeSet) -> Self {
        set.iter().collect()
    }
}

impl fmt::Debug for TypeSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.iter()).finish()
    }
}
