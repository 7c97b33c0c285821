/// Resolution domain - components, bulletins, findings and the rules over them
pub mod domain;
pub mod policies;
pub mod services;
