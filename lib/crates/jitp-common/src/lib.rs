//! Document types shared by the jitp template generator and device tooling.

pub mod policy;
pub mod shadow;
pub mod template;
pub mod topics;

pub use policy::{Effect, PolicyDocument, Statement};
pub use shadow::{ShadowDocument, ShadowState};
pub use template::{
    CertificateProperties, CertificateStatus, DocumentError, Parameter, PolicyProperties,
    ProvisioningTemplate, Resource, TemplateBody, TemplateValue, ThingProperties,
};
pub use topics::ShadowTopics;
