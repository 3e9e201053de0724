/// Declares a private module and re-exports its contents in the parent module
#[macro_export]
macro_rules! submodule {
    ($name:ident) => {
        mod $name;
        pub use $name::*;
    };
}
