// SPDX-License-Identifier: Apache-2.0

use std::collections::BTreeMap;

use relief_atlas_model::{
    MeetingRecord, OrganizationId, OrganizationRecord, PersonRecord, ScopePredicate,
};

#[must_use]
pub fn organization_visible(scope: &ScopePredicate, organization: &OrganizationRecord) -> bool {
    match &organization.state {
        Some(state) => scope.allows_state(state),
        None => scope.allows_missing_state(),
    }
}

#[must_use]
pub fn visible_organizations<'a>(
    scope: &ScopePredicate,
    organizations: &'a [OrganizationRecord],
) -> Vec<&'a OrganizationRecord> {
    organizations
        .iter()
        .filter(|org| organization_visible(scope, org))
        .collect()
}

#[must_use]
pub fn person_visible(
    scope: &ScopePredicate,
    person: &PersonRecord,
    organizations: &BTreeMap<OrganizationId, OrganizationRecord>,
) -> bool {
    organizations
        .get(&person.organization_id)
        .is_some_and(|org| organization_visible(scope, org))
}

#[must_use]
pub fn meeting_visible(
    scope: &ScopePredicate,
    meeting: &MeetingRecord,
    organizations: &BTreeMap<OrganizationId, OrganizationRecord>,
) -> bool {
    organizations
        .get(&meeting.organization_id)
        .is_some_and(|org| organization_visible(scope, org))
}

#[must_use]
pub fn visible_people<'a>(
    scope: &ScopePredicate,
    people: &'a [PersonRecord],
    organizations: &BTreeMap<OrganizationId, OrganizationRecord>,
) -> Vec<&'a PersonRecord> {
    people
        .iter()
        .filter(|person| person_visible(scope, person, organizations))
        .collect()
}

#[must_use]
pub fn visible_meetings<'a>(
    scope: &ScopePredicate,
    meetings: &'a [MeetingRecord],
    organizations: &BTreeMap<OrganizationId, OrganizationRecord>,
) -> Vec<&'a MeetingRecord> {
    meetings
        .iter()
        .filter(|meeting| meeting_visible(scope, meeting, organizations))
        .collect()
}
