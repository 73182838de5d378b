//! Declarative per-operation access policy.
//!
//! Each API operation is named here, and its required role set is
//! declared in one table consulted by the gate before dispatch. Two
//! operations on the same resource may require different roles (listing
//! products is public, deleting one is admin-only). `None` means public.

use bazaar_core::Role;

const ADMIN: &[Role] = &[Role::Admin];
const ADMIN_OR_USER: &[Role] = &[Role::Admin, Role::User];

/// Every gated operation the API exposes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    // Users
    UsersList,
    UsersGet,
    UsersCreate,
    UsersUpdate,
    UsersDelete,
    // Products
    ProductsList,
    ProductsGet,
    ProductsCreate,
    ProductsUpdate,
    ProductsDelete,
    ProductsUploadImages,
    // Categories
    CategoriesList,
    CategoriesGet,
    CategoriesCreate,
    CategoriesUpdate,
    CategoriesDelete,
    // Cart
    CartGet,
    CartAddItem,
    CartUpdateItem,
    CartRemoveItem,
    CartClear,
    // Orders
    OrdersList,
    OrdersListByOwner,
    OrdersGet,
    OrdersCreate,
    OrdersUpdate,
    OrdersUpdateStatus,
    OrdersDelete,
}

impl Operation {
    /// The declared role requirement, or `None` for public operations.
    #[must_use]
    pub const fn required_roles(self) -> Option<&'static [Role]> {
        match self {
            // Product listing is the storefront browse path - public.
            Self::ProductsList => None,

            Self::UsersList
            | Self::UsersGet
            | Self::UsersCreate
            | Self::UsersDelete
            | Self::ProductsCreate
            | Self::ProductsUpdate
            | Self::ProductsDelete
            | Self::ProductsUploadImages
            | Self::CategoriesCreate
            | Self::CategoriesUpdate
            | Self::CategoriesDelete
            | Self::OrdersList
            | Self::OrdersUpdateStatus
            | Self::OrdersDelete => Some(ADMIN),

            Self::UsersUpdate
            | Self::ProductsGet
            | Self::CategoriesList
            | Self::CategoriesGet
            | Self::CartGet
            | Self::CartAddItem
            | Self::CartUpdateItem
            | Self::CartRemoveItem
            | Self::CartClear
            | Self::OrdersListByOwner
            | Self::OrdersGet
            | Self::OrdersCreate
            | Self::OrdersUpdate => Some(ADMIN_OR_USER),
        }
    }
}
