use derive_more::Display;

/// Last Android SDK level (P) that still needs external storage access for camera use
const LAST_SDK_NEEDING_STORAGE: u32 = 28;

/// Runtime permission the scan screen needs before the camera can start
#[derive(Debug, Copy, Clone, Hash, Eq, PartialEq, Display, uniffi::Enum)]
pub enum Permission {
    Camera,
    RecordAudio,
    WriteExternalStorage,
}

impl Permission {
    /// Platform permission name
    pub const fn android_name(self) -> &'static str {
        match self {
            Self::Camera => "android.permission.CAMERA",
            Self::RecordAudio => "android.permission.RECORD_AUDIO",
            Self::WriteExternalStorage => "android.permission.WRITE_EXTERNAL_STORAGE",
        }
    }
}

#[uniffi::export]
pub fn required_permissions(sdk_version: u32) -> Vec<Permission> {
    let mut permissions = vec![Permission::Camera, Permission::RecordAudio];
    if sdk_version <= LAST_SDK_NEEDING_STORAGE {
        permissions.push(Permission::WriteExternalStorage);
    }

    permissions
}

/// Required permissions that are not in `granted`, in request order
pub fn missing_permissions(required: &[Permission], granted: &[Permission]) -> Vec<Permission> {
    required.iter().filter(|permission| !granted.contains(permission)).copied().collect()
}

#[uniffi::export]
fn permission_android_name(permission: Permission) -> String {
    permission.android_name().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_storage_only_required_up_to_p() {
        assert_eq!(
            required_permissions(28),
            vec![Permission::Camera, Permission::RecordAudio, Permission::WriteExternalStorage]
        );
        assert_eq!(required_permissions(29), vec![Permission::Camera, Permission::RecordAudio]);
    }

    #[test]
    fn test_missing_permissions_keeps_order() {
        let required = required_permissions(21);
        let missing = missing_permissions(&required, &[Permission::RecordAudio]);
        assert_eq!(missing, vec![Permission::Camera, Permission::WriteExternalStorage]);

        assert!(missing_permissions(&required, &required).is_empty());
    }

    #[test]
    fn test_android_names() {
        assert_eq!(permission_android_name(Permission::Camera), "android.permission.CAMERA");
    }
}
