pub mod diagnostics;
pub mod extra_params;
pub mod validator;
pub mod volume_codec;
pub mod wire;
