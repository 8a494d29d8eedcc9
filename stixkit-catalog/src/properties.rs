//! Object property types, selected by their `xsi:type`.
//!
//! Each type here is a variant of the `object-properties` registry. The
//! `domain-specific-object-properties` registry starts empty; extensions
//! add their own types to it with [`Context::register_variant`].

use std::sync::LazyLock;
use stixkit_model::{Context, EntityType, FieldDescriptor, FieldKind, ModelResult, Validator};

/// Discriminator key shared by both property registries.
pub const XSI_TYPE: &str = "xsi:type";
pub const OBJECT_PROPERTIES: &str = "object-properties";
pub const DOMAIN_SPECIFIC_PROPERTIES: &str = "domain-specific-object-properties";

pub fn address_type() -> &'static EntityType {
    static TYPE: LazyLock<EntityType> = LazyLock::new(|| {
        EntityType::new("Address", "address")
            .tagged(XSI_TYPE, "AddressObjectType")
            .with_field(FieldDescriptor::optional("category", FieldKind::String))
            .with_field(FieldDescriptor::optional("is_source", FieldKind::Boolean))
            .with_field(FieldDescriptor::optional("is_destination", FieldKind::Boolean))
            .with_field(FieldDescriptor::required("address_value", FieldKind::String))
            .with_field(FieldDescriptor::optional("vlan_name", FieldKind::String))
            .with_field(FieldDescriptor::optional("vlan_num", FieldKind::Integer))
    });
    &TYPE
}

pub fn file_type() -> &'static EntityType {
    static TYPE: LazyLock<EntityType> = LazyLock::new(|| {
        EntityType::new("File", "file")
            .tagged(XSI_TYPE, "FileObjectType")
            .with_field(FieldDescriptor::optional("is_packed", FieldKind::Boolean))
            .with_field(FieldDescriptor::optional("file_name", FieldKind::String))
            .with_field(FieldDescriptor::optional("file_path", FieldKind::String))
            .with_field(FieldDescriptor::optional("file_extension", FieldKind::String))
            .with_field(
                FieldDescriptor::optional("size_in_bytes", FieldKind::Integer)
                    .validated(Validator::Range { min: 0, max: i64::MAX }),
            )
            .with_field(FieldDescriptor::optional("hashes", FieldKind::Dictionary))
    });
    &TYPE
}

pub fn uri_type() -> &'static EntityType {
    static TYPE: LazyLock<EntityType> = LazyLock::new(|| {
        EntityType::new("URI", "uri")
            .tagged(XSI_TYPE, "URIObjectType")
            .with_field(FieldDescriptor::required("value", FieldKind::String))
            .with_field(FieldDescriptor::optional("type", FieldKind::String))
    });
    &TYPE
}

/// Defines both property registries and fills `object-properties`.
pub fn register(ctx: &mut Context) -> ModelResult<()> {
    ctx.define_registry(OBJECT_PROPERTIES, XSI_TYPE);
    ctx.define_registry(DOMAIN_SPECIFIC_PROPERTIES, XSI_TYPE);
    for ty in [address_type(), file_type(), uri_type()] {
        let tag = ty.tag().map_or(ty.name(), |tag| tag.value);
        ctx.register_variant(OBJECT_PROPERTIES, tag, ty)?;
    }
    Ok(())
}
