//! Legacy project kinds and their `ProjectTypeGuids` values.
//!
//! Classic project files list one or more kind GUIDs in
//! `<ProjectTypeGuids>`; SDK-style projects never do. A handful of kinds
//! share a GUID (e.g. Web Application and ASP.NET MVC 5), so lookups by GUID
//! can yield several kinds.

/// A Visual Studio project kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProjectType {
    /// No `ProjectTypeGuids` declared.
    Unspecified,
    AspNet5,
    AspNetMvc1,
    AspNetMvc2,
    AspNetMvc3,
    AspNetMvc4,
    AspNetMvc5,
    CSharp,
    CPlusPlus,
    Database,
    DatabaseOther,
    DeploymentCab,
    DeploymentMergeModule,
    DeploymentSetup,
    DeploymentSmartDeviceCab,
    DistributedSystem,
    Dynamics2012AxCSharpInAot,
    FSharp,
    JSharp,
    LegacySmartDeviceCSharp,
    LegacySmartDeviceVbNet,
    MicroFramework,
    MonoForAndroid,
    MonoTouch,
    MonoTouchBinding,
    PortableClassLibrary,
    ProjectFolders,
    SharePointCSharp,
    SharePointVbNet,
    SharePointWorkflow,
    Silverlight,
    SmartDeviceCSharp,
    SmartDeviceVbNet,
    SolutionFolder,
    Test,
    UniversalWindowsClassLibrary,
    VbNet,
    VisualDatabaseTools,
    VisualStudioInstallerProjectExtension,
    VisualStudioToolsForApplications,
    VisualStudioToolsForOffice,
    WebApplication,
    WebSite,
    WindowsCSharp,
    WindowsVbNet,
    WindowsVisualCPlusPlus,
    WindowsCommunicationFoundation,
    WindowsPhoneBlankHubWebviewApp,
    WindowsPhoneAppCSharp,
    WindowsPhoneAppVbNet,
    WindowsPresentationFoundation,
    WindowsStoreApps,
    WorkflowCSharp,
    WorkflowVbNet,
    WorkflowFoundation,
    XamarinAndroid,
    XamarinIos,
    XnaWindows,
    XnaXbox,
    XnaZune,
}

use ProjectType::*;

/// Kind ↔ GUID table, GUIDs in canonical upper-case braced form.
static PROJECT_TYPE_GUIDS: &[(ProjectType, &str)] = &[
    (AspNet5, "{8BB2217D-0F2D-49D1-97BC-3654ED321F3B}"),
    (AspNetMvc1, "{603C0E0B-DB56-11DC-BE95-000D561079B0}"),
    (AspNetMvc2, "{F85E285D-A4E0-4152-9332-AB1D724D3325}"),
    (AspNetMvc3, "{E53F8FEA-EAE0-44A6-8774-FFD645390401}"),
    (AspNetMvc4, "{E3E379DF-F4C6-4180-9B81-6769533ABE47}"),
    (AspNetMvc5, "{349C5851-65DF-11DA-9384-00065B846F21}"),
    (CSharp, "{FAE04EC0-301F-11D3-BF4B-00C04F79EFBC}"),
    (CPlusPlus, "{8BC9CEB8-8B4A-11D0-8D11-00A0C91BC942}"),
    (Database, "{A9ACE9BB-CECE-4E62-9AA4-C7E7C5BD2124}"),
    (DatabaseOther, "{4F174C21-8C12-11D0-8340-0000F80270F8}"),
    (DeploymentCab, "{3EA9E505-35AC-4774-B492-AD1749C4943A}"),
    (DeploymentMergeModule, "{06A35CCD-C46D-44D5-987B-CF40FF872267}"),
    (DeploymentSetup, "{978C614F-708E-4E1A-B201-565925725DBA}"),
    (DeploymentSmartDeviceCab, "{AB322303-2255-48EF-A496-5904EB18DA55}"),
    (DistributedSystem, "{F135691A-BF7E-435D-8960-F99683D2D49C}"),
    (Dynamics2012AxCSharpInAot, "{BF6F8E12-879D-49E7-ADF0-5503146B24B8}"),
    (FSharp, "{F2A71F9B-5D33-465A-A702-920D77279786}"),
    (JSharp, "{E6FDF86B-F3D1-11D4-8576-0002A516ECE8}"),
    (LegacySmartDeviceCSharp, "{20D4826A-C6FA-45DB-90F4-C717570B9F32}"),
    (LegacySmartDeviceVbNet, "{CB4CE8C6-1BDB-4DC7-A4D3-65A1999772F8}"),
    (MicroFramework, "{B69E3092-B931-443C-ABE7-7E7B65F2A37F}"),
    (MonoForAndroid, "{EFBA0AD7-5A72-4C68-AF49-83D382785DCF}"),
    (MonoTouch, "{6BC8ED88-2882-458C-8E55-DFD12B67127B}"),
    (MonoTouchBinding, "{F5B4F3BC-B597-4E2B-B552-EF5D8A32436F}"),
    (PortableClassLibrary, "{786C830F-07A1-408B-BD7F-6EE04809D6DB}"),
    (ProjectFolders, "{66A26720-8FB5-11D2-AA7E-00C04F688DDE}"),
    (SharePointCSharp, "{593B0543-81F6-4436-BA1E-4747859CAAE2}"),
    (SharePointVbNet, "{EC05E597-79D4-47F3-ADA0-324C4F7C7484}"),
    (SharePointWorkflow, "{F8810EC1-6754-47FC-A15F-DFABD2E3FA90}"),
    (Silverlight, "{A1591282-1198-4647-A2B1-27E5FF5F6F3B}"),
    (SmartDeviceCSharp, "{4D628B5B-2FBC-4AA6-8C16-197242AEB884}"),
    (SmartDeviceVbNet, "{68B1623D-7FB9-47D8-8664-7ECEA3297D4F}"),
    (SolutionFolder, "{2150E333-8FDC-42A3-9474-1A3956D46DE8}"),
    (Test, "{3AC096D0-A1C2-E12C-1390-A8335801FDAB}"),
    (UniversalWindowsClassLibrary, "{A5A43C5B-DE2A-4C0C-9213-0A381AF9435A}"),
    (VbNet, "{F184B08F-C81C-45F6-A57F-5ABD9991F28F}"),
    (VisualDatabaseTools, "{C252FEB5-A946-4202-B1D4-9916A0590387}"),
    (VisualStudioInstallerProjectExtension, "{54435603-DBB4-11D2-8724-00A0C9A8B90C}"),
    (VisualStudioToolsForApplications, "{A860303F-1F3F-4691-B57E-529FC101A107}"),
    (VisualStudioToolsForOffice, "{BAA0C2D2-18E2-41B9-852F-F413020CAA33}"),
    (WebApplication, "{349C5851-65DF-11DA-9384-00065B846F21}"),
    (WebSite, "{E24C65DC-7377-472B-9ABA-BC803B73C61A}"),
    (WindowsCSharp, "{FAE04EC0-301F-11D3-BF4B-00C04F79EFBC}"),
    (WindowsVbNet, "{F184B08F-C81C-45F6-A57F-5ABD9991F28F}"),
    (WindowsVisualCPlusPlus, "{8BC9CEB8-8B4A-11D0-8D11-00A0C91BC942}"),
    (WindowsCommunicationFoundation, "{3D9AD99F-2412-4246-B90B-4EAA41C64699}"),
    (WindowsPhoneBlankHubWebviewApp, "{76F1466A-8B6D-4E39-A767-685A06062A39}"),
    (WindowsPhoneAppCSharp, "{C089C8C0-30E0-4E22-80C0-CE093F111A43}"),
    (WindowsPhoneAppVbNet, "{DB03555F-0C8B-43BE-9FF9-57896B3C5E56}"),
    (WindowsPresentationFoundation, "{60DC8134-EBA5-43B8-BCC9-BB4BC16C2548}"),
    (WindowsStoreApps, "{BC8A1FFA-BEE3-4634-8014-F334798102B3}"),
    (WorkflowCSharp, "{14822709-B5A1-4724-98CA-57A101D1B079}"),
    (WorkflowVbNet, "{D59BE175-2ED0-4C54-BE3D-CDAA9F3214C8}"),
    (WorkflowFoundation, "{32F31D43-81CC-4C15-9DE6-3FC5453562B6}"),
    (XamarinAndroid, "{EFBA0AD7-5A72-4C68-AF49-83D382785DCF}"),
    (XamarinIos, "{6BC8ED88-2882-458C-8E55-DFD12B67127B}"),
    (XnaWindows, "{6D335F3A-9D43-41B4-9D22-F6F17C4BE596}"),
    (XnaXbox, "{2DF5C3F4-5A5F-47A9-8E94-23B4456F55E2}"),
    (XnaZune, "{D399B71A-8929-442A-A9AC-8BEC78BB2433}"),
];

/// Compare GUIDs ignoring case and optional braces.
fn same_guid(a: &str, b: &str) -> bool {
    let strip = |s: &str| s.trim().trim_start_matches('{').trim_end_matches('}').to_string();
    strip(a).eq_ignore_ascii_case(&strip(b))
}

impl ProjectType {
    /// The GUID for this kind; `None` for [`ProjectType::Unspecified`].
    pub fn guid(self) -> Option<&'static str> {
        PROJECT_TYPE_GUIDS
            .iter()
            .find(|(kind, _)| *kind == self)
            .map(|(_, guid)| *guid)
    }

    /// Every kind registered for `guid`.
    pub fn from_guid(guid: &str) -> Vec<ProjectType> {
        PROJECT_TYPE_GUIDS
            .iter()
            .filter(|(_, g)| same_guid(g, guid))
            .map(|(kind, _)| *kind)
            .collect()
    }

    /// `kind` is one of the kinds declared by `guids`.
    ///
    /// [`ProjectType::Unspecified`] matches when no GUIDs are declared.
    pub fn matches(guids: Option<&[String]>, kind: ProjectType) -> bool {
        let guids = guids.unwrap_or_default();
        match kind.guid() {
            None => guids.is_empty(),
            Some(target) => guids.iter().any(|g| same_guid(g, target)),
        }
    }
}
