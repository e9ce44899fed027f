//! # Gramática de Sucessão de Tipos
//!
//! Tabelas estáticas que dizem quais tipos podem (ou devem) aparecer ao lado de outros.
//! São dados de configuração imutáveis, consultados por funções puras sobre [`TypeTag`].
//!
//! - **successors**: dica suave. Após `street_type` vem `street`; quando o vizinho tem
//!   esse tipo entre os candidatos, ele é restrito a ele.
//! - **mandatory_successors**: o tipo só é válido se um destes aparecer logo adiante.
//! - **mandatory_predecessors**: simétrico, olhando para trás.

use crate::tagger::{TypeSet, TypeTag};

/// Quantos grupos sem tipo são tolerados entre dois grupos tipados na propagação.
pub const GAP_TOLERANCE: usize = 1;

/// Quantos grupos sem tipo consecutivos são tolerados dentro de um span em montagem.
pub const ASSEMBLY_GAP: usize = 2;

/// Tipos que todo span aceito precisa cobrir.
pub const MANDATORY_SPAN_TYPES: [TypeTag; 3] = [TypeTag::City, TypeTag::Street, TypeTag::StreetNumber];

fn set(tags: &[TypeTag]) -> TypeSet {
    tags.iter().copied().collect()
}

/// Tipos permitidos imediatamente após `tag` (vazio quando não há dica).
pub fn successors(tag: TypeTag) -> TypeSet {
    use TypeTag::*;
    match tag {
        PostalCodeText => set(&[PostalCode]),
        CountryText => set(&[Country]),
        CountyText => set(&[County]),
        CityText => set(&[City]),
        StreetText => set(&[StreetType, Street]),
        StreetType => set(&[Street]),
        Street => set(&[StreetNumberText, StreetNumber]),
        StreetNumberText => set(&[StreetNumber]),
        BlockText => set(&[Block]),
        StaircaseText => set(&[Staircase]),
        ApartmentText => set(&[Apartment]),
        IntercomText => set(&[Intercom]),
        FloorText => set(&[Floor]),
        _ => TypeSet::EMPTY,
    }
}

/// Tipos dos quais ao menos um deve seguir `tag`; `None` se `tag` não tem exigência.
pub fn mandatory_successors(tag: TypeTag) -> Option<TypeSet> {
    use TypeTag::*;
    match tag {
        AddressPrefix => Some(TypeTag::ALL.into_iter().filter(|t| *t != AddressPrefix).collect()),
        PostalCodeText => Some(set(&[PostalCode])),
        CountryText => Some(set(&[Country])),
        CountyText => Some(set(&[County])),
        CityText => Some(set(&[City])),
        StreetText => Some(set(&[StreetType, Street])),
        StreetType => Some(set(&[Street])),
        StreetNumberText => Some(set(&[StreetNumber])),
        BlockText => Some(set(&[Block])),
        StaircaseText => Some(set(&[Staircase])),
        ApartmentText => Some(set(&[Apartment])),
        IntercomText => Some(set(&[Intercom])),
        FloorText => Some(set(&[Floor])),
        _ => None,
    }
}

/// Tipos dos quais ao menos um deve preceder `tag`; `None` se não há exigência.
pub fn mandatory_predecessors(tag: TypeTag) -> Option<TypeSet> {
    use TypeTag::*;
    match tag {
        Floor => Some(set(&[FloorText])),
        Block => Some(set(&[BlockText])),
        Staircase => Some(set(&[StaircaseText])),
        Apartment => Some(set(&[ApartmentText])),
        Intercom => Some(set(&[IntercomText])),
        StreetNumber => Some(set(&[StreetNumberText, Street])),
        _ => None,
    }
}
